use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tokio::sync::watch;
use uuid::Uuid;

use super::store_error;
use crate::database::DbPool;
use crate::entities::{order_entity, OrderStatus};
use crate::error::{AppError, AppResult};

/// Fields the caller chooses when placing an order. Everything else
/// (id, status, timestamps) is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub item_name: String,
    pub quantity: i32,
}

/// Postgres-backed order store. Every mutation bumps a watch channel so
/// live views know to re-read. Subscribers only learn that something
/// changed, never what; they re-derive their snapshot from the store.
#[derive(Clone)]
pub struct OrderStore {
    pool: DbPool,
    feed: Arc<watch::Sender<u64>>,
}

impl OrderStore {
    pub fn new(pool: DbPool) -> Self {
        let (feed, _) = watch::channel(0u64);
        Self {
            pool,
            feed: Arc::new(feed),
        }
    }

    /// A receiver primed on the current epoch: it wakes on the next
    /// mutation, not on anything that happened before the subscription.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }

    fn touch(&self) {
        self.feed.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
    }

    pub async fn insert(&self, new_order: NewOrder) -> AppResult<order_entity::Model> {
        let row = order_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_name: Set(new_order.item_name),
            quantity: Set(new_order.quantity),
            status: Set(OrderStatus::Pending),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(store_error)?;

        self.touch();
        Ok(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<order_entity::Model>> {
        let row = order_entity::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await
            .map_err(store_error)?;
        row.map(validated).transpose()
    }

    pub async fn mark_completed(
        &self,
        row: order_entity::Model,
        completed_at: DateTime<Utc>,
    ) -> AppResult<order_entity::Model> {
        let mut active = row.into_active_model();
        active.status = Set(OrderStatus::Completed);
        active.completed_at = Set(Some(completed_at));
        let updated = active.update(self.pool.as_ref()).await.map_err(store_error)?;

        self.touch();
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = order_entity::Entity::delete_by_id(id)
            .exec(self.pool.as_ref())
            .await
            .map_err(store_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            self.touch();
        }
        Ok(deleted)
    }

    /// Delete a batch atomically. The daily reset relies on this: either
    /// every listed order goes or none do.
    pub async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.pool.begin().await.map_err(store_error)?;
        let result = order_entity::Entity::delete_many()
            .filter(order_entity::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await
            .map_err(store_error)?;
        txn.commit().await.map_err(store_error)?;

        if result.rows_affected > 0 {
            self.touch();
        }
        Ok(result.rows_affected)
    }

    /// Open orders, newest first.
    pub async fn pending(&self, limit: u64) -> AppResult<Vec<order_entity::Model>> {
        let rows = order_entity::Entity::find()
            .filter(order_entity::Column::Status.eq(OrderStatus::Pending))
            .order_by_desc(order_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error)?;
        rows.into_iter().map(validated).collect()
    }

    /// Orders fulfilled inside `[start, end)`, most recent first.
    pub async fn completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<order_entity::Model>> {
        let rows = order_entity::Entity::find()
            .filter(order_entity::Column::Status.eq(OrderStatus::Completed))
            .filter(order_entity::Column::CompletedAt.gte(start))
            .filter(order_entity::Column::CompletedAt.lt(end))
            .order_by_desc(order_entity::Column::CompletedAt)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error)?;
        rows.into_iter().map(validated).collect()
    }

    /// Every fulfilled order on record. Weekly aggregates start here.
    pub async fn all_completed(&self) -> AppResult<Vec<order_entity::Model>> {
        let rows = order_entity::Entity::find()
            .filter(order_entity::Column::Status.eq(OrderStatus::Completed))
            .order_by_asc(order_entity::Column::CompletedAt)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error)?;
        rows.into_iter().map(validated).collect()
    }
}

/// Reject rows that break the lifecycle contract instead of letting them
/// poison views and aggregates downstream.
fn validated(row: order_entity::Model) -> AppResult<order_entity::Model> {
    match (&row.status, row.completed_at) {
        (OrderStatus::Completed, None) => Err(AppError::InternalError(format!(
            "order {} is completed without a completion time",
            row.id
        ))),
        (OrderStatus::Pending, Some(_)) => Err(AppError::InternalError(format!(
            "order {} is pending but carries a completion time",
            row.id
        ))),
        (_, Some(at)) if at < row.created_at => Err(AppError::InternalError(format!(
            "order {} completed before it was created",
            row.id
        ))),
        _ => Ok(row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn pending_row(item_name: &str) -> order_entity::Model {
        order_entity::Model {
            id: Uuid::new_v4(),
            item_name: item_name.to_string(),
            quantity: 1,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_validated_accepts_both_lifecycle_states() {
        let pending = pending_row("焼き鳥");
        assert!(validated(pending.clone()).is_ok());

        let completed = order_entity::Model {
            status: OrderStatus::Completed,
            completed_at: Some(pending.created_at + Duration::minutes(5)),
            ..pending
        };
        assert!(validated(completed).is_ok());
    }

    #[test]
    fn test_validated_rejects_completed_without_timestamp() {
        let row = order_entity::Model {
            status: OrderStatus::Completed,
            completed_at: None,
            ..pending_row("焼き鳥")
        };
        assert!(matches!(validated(row), Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_validated_rejects_pending_with_timestamp() {
        let row = order_entity::Model {
            completed_at: Some(Utc::now()),
            ..pending_row("焼き鳥")
        };
        assert!(matches!(validated(row), Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_validated_rejects_completion_before_creation() {
        let base = pending_row("焼き鳥");
        let row = order_entity::Model {
            status: OrderStatus::Completed,
            completed_at: Some(base.created_at - Duration::minutes(1)),
            ..base
        };
        assert!(matches!(validated(row), Err(AppError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_insert_wakes_subscribers() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending_row("焼き鳥")]])
            .into_connection());
        let store = OrderStore::new(db);
        let rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let row = store
            .insert(NewOrder {
                item_name: "焼き鳥".to_string(),
                quantity: 1,
            })
            .await
            .unwrap();

        assert_eq!(row.item_name, "焼き鳥");
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribe_starts_at_the_current_epoch() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending_row("たこ焼き")]])
            .into_connection());
        let store = OrderStore::new(db);

        store
            .insert(NewOrder {
                item_name: "たこ焼き".to_string(),
                quantity: 1,
            })
            .await
            .unwrap();

        // A late subscriber must not see the earlier mutation.
        let rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_row_does_not_wake_subscribers() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection());
        let store = OrderStore::new(db);
        let rx = store.subscribe();

        let deleted = store.delete(Uuid::new_v4()).await.unwrap();

        assert!(!deleted);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_delete_many_with_no_ids_skips_the_store() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let store = OrderStore::new(db);
        let rx = store.subscribe();

        assert_eq!(store.delete_many(&[]).await.unwrap(), 0);
        assert!(!rx.has_changed().unwrap());
    }
}
