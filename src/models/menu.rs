use crate::entities::menu_item_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddMenuItemRequest {
    #[schema(example = "たこ焼き")]
    pub name: String,
    /// Unit price in yen.
    #[schema(example = 350)]
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<menu_item_entity::Model> for MenuItemResponse {
    fn from(m: menu_item_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            created_at: m.created_at,
        }
    }
}
