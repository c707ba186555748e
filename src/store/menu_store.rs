use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tokio::sync::watch;
use uuid::Uuid;

use super::store_error;
use crate::database::DbPool;
use crate::entities::menu_item_entity;
use crate::error::AppResult;

/// Catalog store, with the same change feed shape as the order store so
/// menu views stay live too.
#[derive(Clone)]
pub struct MenuStore {
    pool: DbPool,
    feed: Arc<watch::Sender<u64>>,
}

impl MenuStore {
    pub fn new(pool: DbPool) -> Self {
        let (feed, _) = watch::channel(0u64);
        Self {
            pool,
            feed: Arc::new(feed),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }

    fn touch(&self) {
        self.feed.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
    }

    /// The whole catalog in insertion order, oldest first.
    pub async fn list(&self) -> AppResult<Vec<menu_item_entity::Model>> {
        menu_item_entity::Entity::find()
            .order_by_asc(menu_item_entity::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await
            .map_err(store_error)
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<menu_item_entity::Model>> {
        menu_item_entity::Entity::find()
            .filter(menu_item_entity::Column::Name.eq(name))
            .one(self.pool.as_ref())
            .await
            .map_err(store_error)
    }

    pub async fn insert(&self, name: String, price: i64) -> AppResult<menu_item_entity::Model> {
        let row = menu_item_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            price: Set(price),
            created_at: Set(Utc::now()),
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(store_error)?;

        self.touch();
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = menu_item_entity::Entity::delete_by_id(id)
            .exec(self.pool.as_ref())
            .await
            .map_err(store_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            self.touch();
        }
        Ok(deleted)
    }
}
