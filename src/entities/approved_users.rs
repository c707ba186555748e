use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// The allow-list: identities permitted to use the order system. Kept
/// separate from `users` so approval can be granted and revoked without
/// touching credentials.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "approved_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub approved_at: DateTime<Utc>,
    pub approved_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
