use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use uuid::Uuid;

use crate::entities::order_entity;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthUser, DailySalesEntry, HourlySlot, ResetTodayResponse, SalesSummary, WeeklySlot,
};
use crate::services::ApprovalService;
use crate::store::{MenuStore, OrderStore};
use crate::utils::{csv_field, today_window, week_start_date};

#[derive(Clone)]
pub struct AnalyticsService {
    order_store: OrderStore,
    menu_store: MenuStore,
    approval_service: ApprovalService,
}

impl AnalyticsService {
    pub fn new(
        order_store: OrderStore,
        menu_store: MenuStore,
        approval_service: ApprovalService,
    ) -> Self {
        Self {
            order_store,
            menu_store,
            approval_service,
        }
    }

    pub async fn summary(&self, actor: &AuthUser) -> AppResult<SalesSummary> {
        self.approval_service.ensure_approved(actor).await?;

        let completed = self.order_store.all_completed().await?;
        let price_map = self.price_map().await?;
        Ok(compute_summary(&completed, &price_map, &Local::now()))
    }

    /// Today's per-item sales as a CSV attachment: `(filename, content)`.
    pub async fn export_csv(&self, actor: &AuthUser) -> AppResult<(String, String)> {
        self.approval_service.ensure_approved(actor).await?;

        let completed = self.order_store.all_completed().await?;
        let price_map = self.price_map().await?;
        let now = Local::now();
        let summary = compute_summary(&completed, &price_map, &now);
        let filename = format!("daily-sales-{}.csv", now.format("%Y-%m-%d"));
        Ok((filename, render_csv(&summary.daily_sales)))
    }

    /// Delete every order completed today, in one batch. Pending orders
    /// and earlier days' history survive.
    pub async fn reset_today(
        &self,
        actor: &AuthUser,
        confirm: bool,
    ) -> AppResult<ResetTodayResponse> {
        self.approval_service.ensure_approved(actor).await?;
        if !confirm {
            return Err(AppError::ValidationError(
                "Reset requires confirm=true".to_string(),
            ));
        }

        let (start, end) = today_window(&Local::now());
        let rows = self
            .order_store
            .completed_between(start.with_timezone(&Utc), end.with_timezone(&Utc))
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let deleted_count = self.order_store.delete_many(&ids).await?;

        log::info!("Daily reset removed {} completed orders", deleted_count);
        Ok(ResetTodayResponse { deleted_count })
    }

    async fn price_map(&self) -> AppResult<HashMap<String, i64>> {
        let items = self.menu_store.list().await?;
        Ok(items
            .into_iter()
            .map(|item| (item.name, item.price))
            .collect())
    }
}

/// Fold the completed-order history into the dashboard numbers, as seen
/// from `now`'s timezone. Items missing from the price map sell at zero:
/// a deleted menu item must not hide its orders.
fn compute_summary<Tz: TimeZone>(
    completed: &[order_entity::Model],
    price_map: &HashMap<String, i64>,
    now: &DateTime<Tz>,
) -> SalesSummary {
    let tz = now.timezone();
    let (today_start, today_end) = today_window(now);
    let today_start = today_start.with_timezone(&Utc);
    let today_end = today_end.with_timezone(&Utc);
    let week_start = week_start_date(now);

    let mut daily: Vec<DailySalesEntry> = Vec::new();
    let mut hourly: Vec<HourlySlot> = (0..24).map(|hour| HourlySlot { hour, count: 0 }).collect();
    let mut weekly: Vec<WeeklySlot> = (0..7)
        .map(|day| WeeklySlot {
            date: (week_start + Duration::days(day)).format("%Y-%m-%d").to_string(),
            count: 0,
        })
        .collect();
    let mut total_revenue = 0i64;
    let mut minutes_sum = 0f64;
    let mut timed_orders = 0u32;

    for order in completed {
        let Some(completed_at) = order.completed_at else {
            continue;
        };
        let completed_local = completed_at.with_timezone(&tz);
        let quantity = i64::from(order.quantity);

        if completed_at >= today_start && completed_at < today_end {
            let price = price_map.get(&order.item_name).copied().unwrap_or(0);
            let item_revenue = quantity * price;

            match daily.iter_mut().find(|e| e.item_name == order.item_name) {
                Some(entry) => {
                    entry.quantity += quantity;
                    entry.revenue += item_revenue;
                }
                None => daily.push(DailySalesEntry {
                    item_name: order.item_name.clone(),
                    quantity,
                    revenue: item_revenue,
                }),
            }

            hourly[completed_local.hour() as usize].count += quantity;
            total_revenue += item_revenue;

            let elapsed = completed_at - order.created_at;
            minutes_sum += elapsed.num_milliseconds() as f64 / 60_000.0;
            timed_orders += 1;
        }

        let date_key = completed_local.date_naive().format("%Y-%m-%d").to_string();
        if let Some(slot) = weekly.iter_mut().find(|s| s.date == date_key) {
            slot.count += quantity;
        }
    }

    // Stable sort: items tied on quantity keep first-completed-first order.
    daily.sort_by(|a, b| b.quantity.cmp(&a.quantity));

    let total_orders: i64 = daily.iter().map(|entry| entry.quantity).sum();
    let best_seller = daily.first().cloned();
    // First strict maximum wins, so an all-zero day reads as hour 0.
    let peak_hour = hourly
        .iter()
        .fold((0u32, 0i64), |max, slot| {
            if slot.count > max.1 {
                (slot.hour, slot.count)
            } else {
                max
            }
        })
        .0;
    let average_order_minutes = if timed_orders > 0 {
        minutes_sum / f64::from(timed_orders)
    } else {
        0.0
    };

    SalesSummary {
        daily_sales: daily,
        hourly_sales: hourly,
        weekly_sales: weekly,
        total_orders,
        total_revenue,
        average_order_minutes,
        best_seller,
        peak_hour,
    }
}

fn render_csv(daily_sales: &[DailySalesEntry]) -> String {
    let mut lines = vec!["Item Name,Quantity Sold,Revenue".to_string()];
    for entry in daily_sales {
        lines.push(format!(
            "{},{},¥{}",
            csv_field(&entry.item_name),
            entry.quantity,
            entry.revenue
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use chrono::FixedOffset;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn tokyo() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    /// 2025-07-05 is a Saturday; the week runs from Sunday 2025-06-29.
    fn now() -> DateTime<FixedOffset> {
        tokyo().with_ymd_and_hms(2025, 7, 5, 18, 0, 0).unwrap()
    }

    fn completed_order(
        item_name: &str,
        quantity: i32,
        created: DateTime<FixedOffset>,
        completed: DateTime<FixedOffset>,
    ) -> order_entity::Model {
        order_entity::Model {
            id: Uuid::new_v4(),
            item_name: item_name.to_string(),
            quantity,
            status: OrderStatus::Completed,
            created_at: created.with_timezone(&Utc),
            completed_at: Some(completed.with_timezone(&Utc)),
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<FixedOffset> {
        tokyo().with_ymd_and_hms(2025, 7, 5, hour, min, 0).unwrap()
    }

    fn prices(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs
            .iter()
            .map(|(name, price)| (name.to_string(), *price))
            .collect()
    }

    #[test]
    fn test_daily_sales_rank_by_quantity_with_stable_ties() {
        let orders = vec![
            completed_order("焼き鳥", 3, at(10, 0), at(10, 5)),
            completed_order("たこ焼き", 5, at(10, 10), at(10, 15)),
            completed_order("餃子", 3, at(10, 20), at(10, 25)),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        let names: Vec<&str> = summary
            .daily_sales
            .iter()
            .map(|e| e.item_name.as_str())
            .collect();
        // たこ焼き leads; the tie keeps 焼き鳥 before 餃子.
        assert_eq!(names, vec!["たこ焼き", "焼き鳥", "餃子"]);
        assert_eq!(summary.best_seller.as_ref().unwrap().item_name, "たこ焼き");
        assert_eq!(summary.total_orders, 11);
    }

    #[test]
    fn test_unknown_items_sell_at_price_zero() {
        let orders = vec![
            completed_order("焼き鳥", 2, at(11, 0), at(11, 10)),
            completed_order("幻のメニュー", 4, at(11, 5), at(11, 15)),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        assert_eq!(summary.total_revenue, 400);
        let ghost = summary
            .daily_sales
            .iter()
            .find(|e| e.item_name == "幻のメニュー")
            .unwrap();
        assert_eq!(ghost.quantity, 4);
        assert_eq!(ghost.revenue, 0);
    }

    #[test]
    fn test_yesterday_counts_in_weekly_but_not_daily() {
        let yesterday = tokyo().with_ymd_and_hms(2025, 7, 4, 19, 0, 0).unwrap();
        let orders = vec![
            completed_order("焼き鳥", 2, at(12, 0), at(12, 10)),
            completed_order("焼き鳥", 7, yesterday, yesterday),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_revenue, 400);

        let friday = summary
            .weekly_sales
            .iter()
            .find(|s| s.date == "2025-07-04")
            .unwrap();
        assert_eq!(friday.count, 7);
        let saturday = summary
            .weekly_sales
            .iter()
            .find(|s| s.date == "2025-07-05")
            .unwrap();
        assert_eq!(saturday.count, 2);
    }

    #[test]
    fn test_local_date_decides_today_not_utc_date() {
        // 08:00 on 2025-07-05 in Tokyo is still 2025-07-04 in UTC.
        let early = at(8, 0);
        let orders = vec![completed_order("焼き鳥", 1, early, early)];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        assert_eq!(summary.total_orders, 1);
        assert_eq!(summary.hourly_sales[8].count, 1);
    }

    #[test]
    fn test_hourly_always_has_24_slots() {
        let orders = vec![completed_order("焼き鳥", 3, at(14, 0), at(14, 30))];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        assert_eq!(summary.hourly_sales.len(), 24);
        assert_eq!(summary.hourly_sales[14].count, 3);
        let nonzero = summary.hourly_sales.iter().filter(|s| s.count != 0).count();
        assert_eq!(nonzero, 1);
    }

    #[test]
    fn test_weekly_always_has_seven_sunday_start_slots() {
        let summary = compute_summary(&[], &HashMap::new(), &now());

        let dates: Vec<&str> = summary.weekly_sales.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2025-06-29",
                "2025-06-30",
                "2025-07-01",
                "2025-07-02",
                "2025-07-03",
                "2025-07-04",
                "2025-07-05"
            ]
        );
        assert!(summary.weekly_sales.iter().all(|s| s.count == 0));
    }

    #[test]
    fn test_average_minutes_covers_today_only() {
        let yesterday = tokyo().with_ymd_and_hms(2025, 7, 4, 10, 0, 0).unwrap();
        let orders = vec![
            completed_order("焼き鳥", 1, at(12, 0), at(12, 4)),
            completed_order("焼き鳥", 1, at(12, 10), at(12, 16)),
            completed_order("焼き鳥", 1, yesterday, yesterday + Duration::minutes(60)),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());

        assert!((summary.average_order_minutes - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_is_zero_with_no_completions_today() {
        let summary = compute_summary(&[], &HashMap::new(), &now());
        assert_eq!(summary.average_order_minutes, 0.0);
    }

    #[test]
    fn test_peak_hour_takes_the_earliest_strict_maximum() {
        let orders = vec![
            completed_order("焼き鳥", 2, at(10, 0), at(10, 30)),
            completed_order("焼き鳥", 2, at(14, 0), at(14, 30)),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());
        assert_eq!(summary.peak_hour, 10);

        let orders = vec![
            completed_order("焼き鳥", 2, at(10, 0), at(10, 30)),
            completed_order("焼き鳥", 3, at(14, 0), at(14, 30)),
        ];
        let summary = compute_summary(&orders, &prices(&[("焼き鳥", 200)]), &now());
        assert_eq!(summary.peak_hour, 14);
    }

    #[test]
    fn test_peak_hour_is_zero_on_an_empty_day() {
        let summary = compute_summary(&[], &HashMap::new(), &now());
        assert_eq!(summary.peak_hour, 0);
    }

    #[test]
    fn test_csv_lists_rows_in_rank_order() {
        let daily = vec![
            DailySalesEntry {
                item_name: "たこ焼き".to_string(),
                quantity: 5,
                revenue: 1750,
            },
            DailySalesEntry {
                item_name: "焼き鳥".to_string(),
                quantity: 3,
                revenue: 600,
            },
        ];
        let csv = render_csv(&daily);

        assert_eq!(
            csv,
            "Item Name,Quantity Sold,Revenue\nたこ焼き,5,¥1750\n焼き鳥,3,¥600"
        );
    }

    #[test]
    fn test_csv_quotes_awkward_item_names() {
        let daily = vec![DailySalesEntry {
            item_name: "rice, extra".to_string(),
            quantity: 1,
            revenue: 100,
        }];
        let csv = render_csv(&daily);

        assert_eq!(csv, "Item Name,Quantity Sold,Revenue\n\"rice, extra\",1,¥100");
    }

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "boss@yatai.example".to_string(),
        }
    }

    fn service(db: crate::database::DbPool) -> AnalyticsService {
        let approval = ApprovalService::new(db.clone(), vec!["boss@yatai.example".to_string()]);
        AnalyticsService::new(OrderStore::new(db.clone()), MenuStore::new(db), approval)
    }

    #[tokio::test]
    async fn test_reset_refuses_without_confirmation() {
        // Nothing is mocked: any store call would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db);

        let err = service.reset_today(&admin(), false).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_reset_deletes_todays_completed_batch() {
        let order = completed_order("焼き鳥", 1, at(12, 0), at(12, 10));
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order.clone(), order]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection());
        let service = service(db);

        let response = service.reset_today(&admin(), true).await.unwrap();
        assert_eq!(response.deleted_count, 2);
    }

    #[tokio::test]
    async fn test_reset_with_nothing_completed_deletes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order_entity::Model>::new()])
            .into_connection());
        let service = service(db);

        let response = service.reset_today(&admin(), true).await.unwrap();
        assert_eq!(response.deleted_count, 0);
    }
}
