use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-item sales line for today, ranked by quantity (best seller first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySalesEntry {
    pub item_name: String,
    pub quantity: i64,
    pub revenue: i64,
}

/// Completions counted into one hour of today. All 24 slots are always
/// present, zeroes included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlySlot {
    pub hour: u32,
    pub count: i64,
}

/// Completions counted into one day of the current Sunday-start week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklySlot {
    /// yyyy-MM-dd in stall-local time.
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesSummary {
    pub daily_sales: Vec<DailySalesEntry>,
    pub hourly_sales: Vec<HourlySlot>,
    pub weekly_sales: Vec<WeeklySlot>,
    pub total_orders: i64,
    pub total_revenue: i64,
    /// Mean minutes from creation to fulfillment, today only. Zero when
    /// nothing completed today.
    pub average_order_minutes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_seller: Option<DailySalesEntry>,
    pub peak_hour: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetTodayRequest {
    /// Must be true. The endpoint refuses to delete anything otherwise.
    pub confirm: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetTodayResponse {
    pub deleted_count: u64,
}
