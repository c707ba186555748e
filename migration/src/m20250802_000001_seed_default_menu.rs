use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum MenuItems {
    Table,
    Id,
    Name,
    Price,
}

const DEFAULT_MENU: [(&str, i64); 10] = [
    ("焼き鳥", 200),
    ("焼き鳥 x2", 400),
    ("焼き鳥 x3", 600),
    ("たこ焼き", 300),
    ("お好み焼き", 500),
    ("ラーメン", 800),
    ("うどん", 600),
    ("寿司", 1000),
    ("天ぷら", 700),
    ("餃子", 400),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(MenuItems::Table)
            .columns([MenuItems::Id, MenuItems::Name, MenuItems::Price])
            .to_owned();
        for (name, price) in DEFAULT_MENU {
            insert.values_panic([
                Expr::cust("gen_random_uuid()").into(),
                name.into(),
                price.into(),
            ]);
        }
        // keep re-runs and already-customized catalogs intact
        insert.on_conflict(
            OnConflict::column(MenuItems::Name)
                .do_nothing()
                .to_owned(),
        );
        manager.exec_stmt(insert).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = DEFAULT_MENU.iter().map(|(name, _)| *name).collect();
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(MenuItems::Table)
                    .and_where(Expr::col(MenuItems::Name).is_in(names))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
