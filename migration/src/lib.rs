pub use sea_orm_migration::prelude::*;

mod m20250705_000001_create_orders;
mod m20250705_000002_create_menu_items;
mod m20250705_000003_create_auth_tables;
mod m20250719_000001_add_order_quantity;
mod m20250802_000001_seed_default_menu;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250705_000001_create_orders::Migration),
            Box::new(m20250705_000002_create_menu_items::Migration),
            Box::new(m20250705_000003_create_auth_tables::Migration),
            Box::new(m20250719_000001_add_order_quantity::Migration),
            Box::new(m20250802_000001_seed_default_menu::Migration),
        ]
    }
}
