use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AddMenuItemRequest, AuthUser, MenuItemResponse};
use crate::services::ApprovalService;
use crate::store::MenuStore;

#[derive(Clone)]
pub struct MenuService {
    store: MenuStore,
    approval_service: ApprovalService,
}

impl MenuService {
    pub fn new(store: MenuStore, approval_service: ApprovalService) -> Self {
        Self {
            store,
            approval_service,
        }
    }

    pub async fn list(&self, actor: &AuthUser) -> AppResult<Vec<MenuItemResponse>> {
        self.approval_service.ensure_approved(actor).await?;
        let rows = self.store.list().await?;
        Ok(rows.into_iter().map(MenuItemResponse::from).collect())
    }

    pub async fn add_item(
        &self,
        actor: &AuthUser,
        request: AddMenuItemRequest,
    ) -> AppResult<MenuItemResponse> {
        self.approval_service.ensure_approved(actor).await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Item name must not be empty".to_string(),
            ));
        }
        if request.price < 0 {
            return Err(AppError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        if self.store.find_by_name(&name).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Menu already has an item named {}",
                name
            )));
        }

        let row = self.store.insert(name, request.price).await?;
        log::info!("Menu item added: {} ({}円)", row.name, row.price);
        Ok(MenuItemResponse::from(row))
    }

    /// Removing an item never touches orders already placed for it:
    /// orders reference the catalog by name only.
    pub async fn remove_item(&self, actor: &AuthUser, id: Uuid) -> AppResult<()> {
        self.approval_service.ensure_approved(actor).await?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Menu item {} not found", id)));
        }
        log::info!("Menu item {} removed", id);
        Ok(())
    }

    /// Live catalog view, same contract as the order streams.
    pub async fn subscribe(
        &self,
        actor: &AuthUser,
    ) -> AppResult<watch::Receiver<Vec<MenuItemResponse>>> {
        self.approval_service.ensure_approved(actor).await?;

        let initial = self.snapshot().await?;
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
                        match service.snapshot().await {
                            Ok(snapshot) => {
                                if tx.send(snapshot).is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("Live menu view refresh failed: {}", e),
                        }
                    }
                    _ = tx.closed() => break,
                }
            }
        });

        Ok(rx)
    }

    async fn snapshot(&self) -> AppResult<Vec<MenuItemResponse>> {
        let rows = self.store.list().await?;
        Ok(rows.into_iter().map(MenuItemResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::menu_item_entity;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "boss@yatai.example".to_string(),
        }
    }

    fn service(db: crate::database::DbPool) -> MenuService {
        let approval = ApprovalService::new(db.clone(), vec!["boss@yatai.example".to_string()]);
        MenuService::new(MenuStore::new(db), approval)
    }

    fn item(name: &str, price: i64) -> menu_item_entity::Model {
        menu_item_entity::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_item_rejects_duplicate_names() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![item("たこ焼き", 350)]])
            .into_connection());
        let service = service(db);

        let err = service
            .add_item(
                &admin(),
                AddMenuItemRequest {
                    name: "たこ焼き".to_string(),
                    price: 400,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_add_item_rejects_negative_price() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db);

        let err = service
            .add_item(
                &admin(),
                AddMenuItemRequest {
                    name: "たこ焼き".to_string(),
                    price: -1,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_add_item_trims_the_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<menu_item_entity::Model>::new()])
            .append_query_results([vec![item("たこ焼き", 350)]])
            .into_connection());
        let service = service(db);

        let response = service
            .add_item(
                &admin(),
                AddMenuItemRequest {
                    name: "  たこ焼き  ".to_string(),
                    price: 350,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.name, "たこ焼き");
    }

    #[tokio::test]
    async fn test_live_view_refreshes_after_a_mutation() {
        let added = item("餃子", 400);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<menu_item_entity::Model>::new()])
            .append_query_results([Vec::<menu_item_entity::Model>::new()])
            .append_query_results([vec![added.clone()]])
            .append_query_results([vec![added.clone()]])
            .into_connection());
        let service = service(db);

        let mut rx = service.subscribe(&admin()).await.unwrap();
        assert!(rx.borrow().is_empty());

        service
            .add_item(
                &admin(),
                AddMenuItemRequest {
                    name: "餃子".to_string(),
                    price: 400,
                },
            )
            .await
            .unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
