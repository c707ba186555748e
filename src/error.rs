use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// No authenticated or approved identity; rejected before any store call.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The database could not serve a read or write.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),

    /// The database rejected the statement on authorization grounds.
    #[error("Permission denied by the store")]
    PermissionDenied,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::AccessDenied(msg) => {
                log::warn!("Access denied: {msg}");
                (actix_web::http::StatusCode::FORBIDDEN, "ACCESS_DENIED", msg)
            }
            AppError::StoreUnavailable(err) => {
                log::error!("Store unavailable: {err}");
                (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    &"The order store is unavailable".to_string(),
                )
            }
            AppError::PermissionDenied => {
                log::error!("Store rejected the statement for lack of privileges");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "PERMISSION_DENIED",
                    &"The store rejected this operation; check the database role grants".to_string(),
                )
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg,
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (actix_web::http::StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg)
            }
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    &"Invalid or expired token".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    &"Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
