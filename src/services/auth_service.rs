use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::database::DbPool;
use crate::entities::{pending_user_entity, user_entity};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ApprovalService;
use crate::utils::{hash_password, validate_email, validate_password, verify_password, JwtService};

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    approval_service: ApprovalService,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, approval_service: ApprovalService) -> Self {
        Self {
            pool,
            jwt_service,
            approval_service,
        }
    }

    /// Create an account and park it in the waiting room. No tokens are
    /// issued here: the caller logs in once an admin approves them.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<SignupResponse> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password(&request.password)?;
        if request.password != request.password_confirmation {
            return Err(AppError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        let existing = user_entity::Entity::find()
            .filter(user_entity::Column::Email.eq(email.clone()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        // Account and waiting-room entry land together or not at all.
        let txn = self.pool.begin().await?;
        let user = user_entity::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        pending_user_entity::ActiveModel {
            user_id: Set(user.id),
            email: Set(email.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("New signup waiting for approval: {}", email);
        Ok(SignupResponse {
            email,
            approval_pending: true,
        })
    }

    /// Login succeeds with valid credentials whether or not the account
    /// is approved. The `approved` flag tells the client which screens to
    /// show; the approval gate itself sits on every data operation.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = user_entity::Entity::find()
            .filter(user_entity::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        let approved = self.approval_service.is_approved(&user.email).await?;
        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, &user.email)?;

        Ok(AuthResponse {
            user: UserResponse::new(user, approved),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// Trade a refresh token for a fresh access token. The approval flag
    /// is re-read so a decision made since login shows up here.
    pub async fn refresh_token(&self, token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = user_entity::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        let approved = self.approval_service.is_approved(&user.email).await?;
        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;

        Ok(AuthResponse {
            user: UserResponse::new(user, approved),
            access_token,
            refresh_token: token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}
