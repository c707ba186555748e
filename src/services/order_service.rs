use chrono::{Local, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use crate::entities::OrderStatus;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthUser, CompleteOrderRequest, CreateOrderRequest, OrderResponse, OrderView,
};
use crate::services::ApprovalService;
use crate::store::{NewOrder, OrderStore};
use crate::utils::today_window;

const DEFAULT_PENDING_LIMIT: u64 = 100;
const MAX_PENDING_LIMIT: u64 = 500;

#[derive(Clone)]
pub struct OrderService {
    store: OrderStore,
    approval_service: ApprovalService,
}

impl OrderService {
    pub fn new(store: OrderStore, approval_service: ApprovalService) -> Self {
        Self {
            store,
            approval_service,
        }
    }

    pub async fn create_order(
        &self,
        actor: &AuthUser,
        request: CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        self.approval_service.ensure_approved(actor).await?;

        let item_name = request.item_name.trim().to_string();
        if item_name.is_empty() {
            return Err(AppError::ValidationError(
                "Item name must not be empty".to_string(),
            ));
        }
        let quantity = request.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let row = self
            .store
            .insert(NewOrder {
                item_name,
                quantity,
            })
            .await?;
        log::info!("Order {} placed: {} x{}", row.id, row.item_name, row.quantity);
        Ok(OrderResponse::from(row))
    }

    /// Move an order to completed. Completing an already-completed order
    /// is a no-op that returns it unchanged: the first completion time
    /// stands, whatever later calls carry.
    pub async fn complete_order(
        &self,
        actor: &AuthUser,
        id: Uuid,
        request: CompleteOrderRequest,
    ) -> AppResult<OrderResponse> {
        self.approval_service.ensure_approved(actor).await?;

        let row = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
        if row.status == OrderStatus::Completed {
            return Ok(OrderResponse::from(row));
        }

        let now = Utc::now();
        let completed_at = request.completed_at.unwrap_or(now);
        if completed_at < row.created_at {
            return Err(AppError::ValidationError(
                "Completion time is before the order was placed".to_string(),
            ));
        }
        if completed_at > now {
            return Err(AppError::ValidationError(
                "Completion time is in the future".to_string(),
            ));
        }

        let updated = self.store.mark_completed(row, completed_at).await?;
        log::info!("Order {} completed", updated.id);
        Ok(OrderResponse::from(updated))
    }

    /// Cancellation is deletion. A cancelled order leaves no trace in
    /// views or aggregates.
    pub async fn cancel_order(&self, actor: &AuthUser, id: Uuid) -> AppResult<()> {
        self.approval_service.ensure_approved(actor).await?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Order {} not found", id)));
        }
        log::info!("Order {} cancelled", id);
        Ok(())
    }

    pub async fn pending_orders(
        &self,
        actor: &AuthUser,
        limit: Option<u64>,
    ) -> AppResult<Vec<OrderResponse>> {
        self.approval_service.ensure_approved(actor).await?;

        let limit = limit
            .unwrap_or(DEFAULT_PENDING_LIMIT)
            .clamp(1, MAX_PENDING_LIMIT);
        let rows = self.store.pending(limit).await?;
        Ok(rows.into_iter().map(OrderResponse::from).collect())
    }

    pub async fn todays_completed(&self, actor: &AuthUser) -> AppResult<Vec<OrderResponse>> {
        self.approval_service.ensure_approved(actor).await?;
        self.completed_today_snapshot().await
    }

    /// Open a live view. The receiver starts on a current snapshot and is
    /// refreshed after every store mutation until the subscriber goes
    /// away. A failed refresh keeps the previous snapshot on the channel;
    /// the subscription itself survives.
    pub async fn subscribe(
        &self,
        actor: &AuthUser,
        view: OrderView,
    ) -> AppResult<watch::Receiver<Vec<OrderResponse>>> {
        self.approval_service.ensure_approved(actor).await?;

        let initial = self.snapshot(view).await?;
        let (tx, rx) = watch::channel(initial);
        let mut feed = self.store.subscribe();
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = feed.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        match service.snapshot(view).await {
                            Ok(snapshot) => {
                                if tx.send(snapshot).is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("Live order view refresh failed: {}", e),
                        }
                    }
                    _ = tx.closed() => break,
                }
            }
        });

        Ok(rx)
    }

    async fn snapshot(&self, view: OrderView) -> AppResult<Vec<OrderResponse>> {
        match view {
            OrderView::Pending => {
                let rows = self.store.pending(DEFAULT_PENDING_LIMIT).await?;
                Ok(rows.into_iter().map(OrderResponse::from).collect())
            }
            OrderView::CompletedToday => self.completed_today_snapshot().await,
        }
    }

    async fn completed_today_snapshot(&self) -> AppResult<Vec<OrderResponse>> {
        let (start, end) = today_window(&Local::now());
        let rows = self
            .store
            .completed_between(start.with_timezone(&Utc), end.with_timezone(&Utc))
            .await?;
        Ok(rows.into_iter().map(OrderResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order_entity;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "boss@yatai.example".to_string(),
        }
    }

    fn approval(db: &crate::database::DbPool) -> ApprovalService {
        ApprovalService::new(db.clone(), vec!["boss@yatai.example".to_string()])
    }

    fn pending_row(item_name: &str, quantity: i32) -> order_entity::Model {
        order_entity::Model {
            id: Uuid::new_v4(),
            item_name: item_name.to_string(),
            quantity,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn service(db: crate::database::DbPool) -> OrderService {
        let approval = approval(&db);
        OrderService::new(OrderStore::new(db), approval)
    }

    #[tokio::test]
    async fn test_create_order_defaults_quantity_to_one() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending_row("焼き鳥", 1)]])
            .into_connection());
        let service = service(db);

        let response = service
            .create_order(
                &admin(),
                CreateOrderRequest {
                    item_name: "焼き鳥".to_string(),
                    quantity: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.quantity, 1);
        assert_eq!(response.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_order_rejects_blank_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db);

        let err = service
            .create_order(
                &admin(),
                CreateOrderRequest {
                    item_name: "   ".to_string(),
                    quantity: Some(1),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_non_positive_quantity() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db);

        let err = service
            .create_order(
                &admin(),
                CreateOrderRequest {
                    item_name: "焼き鳥".to_string(),
                    quantity: Some(0),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_unapproved_actor_is_stopped_before_the_store() {
        // Only the allow-list lookup is mocked. If the order insert were
        // attempted the mock would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::entities::approved_user_entity::Model>::new()])
            .into_connection());
        let service = service(db);
        let actor = AuthUser {
            id: 2,
            email: "staff@yatai.example".to_string(),
        };

        let err = service
            .create_order(
                &actor,
                CreateOrderRequest {
                    item_name: "焼き鳥".to_string(),
                    quantity: Some(1),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_complete_order_sets_the_completion_time() {
        let row = pending_row("たこ焼き", 2);
        let completed_at = row.created_at + Duration::minutes(5);
        let updated = order_entity::Model {
            status: OrderStatus::Completed,
            completed_at: Some(completed_at),
            ..row.clone()
        };
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()], vec![updated]])
            .into_connection());
        let service = service(db);

        let response = service
            .complete_order(
                &admin(),
                row.id,
                CompleteOrderRequest {
                    completed_at: Some(completed_at),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.status, OrderStatus::Completed);
        assert_eq!(response.completed_at, Some(completed_at));
    }

    #[tokio::test]
    async fn test_completing_twice_keeps_the_first_time() {
        let first_time = Utc::now() - Duration::minutes(10);
        let row = order_entity::Model {
            status: OrderStatus::Completed,
            completed_at: Some(first_time),
            ..pending_row("たこ焼き", 1)
        };
        // Only the lookup is mocked: a second update would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection());
        let service = service(db);

        let response = service
            .complete_order(&admin(), row.id, CompleteOrderRequest::default())
            .await
            .unwrap();

        assert_eq!(response.completed_at, Some(first_time));
    }

    #[tokio::test]
    async fn test_complete_order_rejects_time_before_creation() {
        let row = pending_row("たこ焼き", 1);
        let too_early = row.created_at - Duration::minutes(1);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection());
        let service = service(db);

        let err = service
            .complete_order(
                &admin(),
                row.id,
                CompleteOrderRequest {
                    completed_at: Some(too_early),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_complete_order_rejects_future_time() {
        let row = pending_row("たこ焼き", 1);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection());
        let service = service(db);

        let err = service
            .complete_order(
                &admin(),
                row.id,
                CompleteOrderRequest {
                    completed_at: Some(Utc::now() + Duration::minutes(10)),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_complete_unknown_order_is_not_found() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order_entity::Model>::new()])
            .into_connection());
        let service = service(db);

        let err = service
            .complete_order(&admin(), Uuid::new_v4(), CompleteOrderRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_is_not_found() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection());
        let service = service(db);

        let err = service.cancel_order(&admin(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_live_view_refreshes_after_a_mutation() {
        // Mock sequence: initial snapshot, the insert, the refreshed
        // snapshot the spawned task re-reads.
        let placed = pending_row("焼き鳥", 1);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order_entity::Model>::new()])
            .append_query_results([vec![placed.clone()]])
            .append_query_results([vec![placed.clone()]])
            .into_connection());
        let service = service(db);

        let mut rx = service.subscribe(&admin(), OrderView::Pending).await.unwrap();
        assert!(rx.borrow().is_empty());

        service
            .create_order(
                &admin(),
                CreateOrderRequest {
                    item_name: "焼き鳥".to_string(),
                    quantity: Some(1),
                },
            )
            .await
            .unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].item_name, "焼き鳥");
    }
}
