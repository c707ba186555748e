use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::database::DbPool;
use crate::entities::{approved_user_entity, pending_user_entity};
use crate::error::{AppError, AppResult};
use crate::models::{ApprovedUserResponse, AuthUser, PendingUserResponse};

/// The approval gate. Signup parks an account in the waiting room; an
/// admin moves it onto the allow-list. Admins themselves are configured
/// by email and never need an allow-list row.
#[derive(Clone)]
pub struct ApprovalService {
    pool: DbPool,
    admin_emails: Arc<Vec<String>>,
}

impl ApprovalService {
    pub fn new(pool: DbPool, admin_emails: Vec<String>) -> Self {
        let admin_emails = admin_emails
            .into_iter()
            .map(|email| email.to_lowercase())
            .collect();
        Self {
            pool,
            admin_emails: Arc::new(admin_emails),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }

    pub async fn is_approved(&self, email: &str) -> AppResult<bool> {
        if self.is_admin(email) {
            return Ok(true);
        }
        let row = approved_user_entity::Entity::find()
            .filter(approved_user_entity::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?;
        Ok(row.is_some())
    }

    /// Every order, menu and analytics operation calls this before
    /// touching the store.
    pub async fn ensure_approved(&self, actor: &AuthUser) -> AppResult<()> {
        if self.is_approved(&actor.email).await? {
            Ok(())
        } else {
            Err(AppError::AccessDenied(
                "Your account is waiting for approval".to_string(),
            ))
        }
    }

    pub fn ensure_admin(&self, actor: &AuthUser) -> AppResult<()> {
        if self.is_admin(&actor.email) {
            Ok(())
        } else {
            Err(AppError::AccessDenied("Admin access required".to_string()))
        }
    }

    /// Signups still waiting for a decision, oldest first.
    pub async fn pending(&self, actor: &AuthUser) -> AppResult<Vec<PendingUserResponse>> {
        self.ensure_admin(actor)?;
        let rows = pending_user_entity::Entity::find()
            .order_by_asc(pending_user_entity::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(PendingUserResponse::from).collect())
    }

    /// Move one signup from the waiting room onto the allow-list. The two
    /// writes happen in one transaction so a crash cannot leave the
    /// account half approved.
    pub async fn approve(
        &self,
        actor: &AuthUser,
        pending_id: i64,
    ) -> AppResult<ApprovedUserResponse> {
        self.ensure_admin(actor)?;

        let txn = self.pool.begin().await?;
        let pending = pending_user_entity::Entity::find_by_id(pending_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pending signup not found".to_string()))?;

        // Approving twice is harmless: reuse the existing row.
        let existing = approved_user_entity::Entity::find()
            .filter(approved_user_entity::Column::Email.eq(pending.email.clone()))
            .one(&txn)
            .await?;
        let approved = match existing {
            Some(row) => row,
            None => {
                approved_user_entity::ActiveModel {
                    email: Set(pending.email.clone()),
                    approved_at: Set(Utc::now()),
                    approved_by: Set(actor.email.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        pending_user_entity::Entity::delete_by_id(pending.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        log::info!("Approved {} (by {})", approved.email, actor.email);
        Ok(ApprovedUserResponse::from(approved))
    }

    /// Drop a signup from the waiting room. The account keeps its
    /// credentials but stays locked out.
    pub async fn reject(&self, actor: &AuthUser, pending_id: i64) -> AppResult<()> {
        self.ensure_admin(actor)?;

        let result = pending_user_entity::Entity::delete_by_id(pending_id)
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Pending signup not found".to_string()));
        }

        log::info!("Rejected pending signup {} (by {})", pending_id, actor.email);
        Ok(())
    }
}
