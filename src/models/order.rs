use crate::entities::{order_entity, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(example = "焼き鳥")]
    pub item_name: String,
    /// Defaults to 1 when omitted.
    #[schema(example = 2)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CompleteOrderRequest {
    /// Fulfillment instant. The server clock is used when omitted.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            item_name: m.item_name,
            quantity: m.quantity,
            status: m.status,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub limit: Option<u64>,
}

/// Which live view a stream subscription follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OrderView {
    Pending,
    CompletedToday,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderStreamQuery {
    pub view: Option<OrderView>,
}
