use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::error::AppError;
use crate::models::*;
use crate::services::ApprovalService;

fn auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    get,
    path = "/admin/pending-users",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Signups waiting for a decision, oldest first"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn pending_users(
    approval_service: web::Data<ApprovalService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match approval_service.pending(&actor).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/pending-users/{id}/approve",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Pending signup id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Account approved", body = ApprovedUserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such pending signup")
    )
)]
pub async fn approve_user(
    approval_service: web::Data<ApprovalService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match approval_service.approve(&actor, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/pending-users/{id}/reject",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Pending signup id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Signup rejected and removed from the waiting room"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such pending signup")
    )
)]
pub async fn reject_user(
    approval_service: web::Data<ApprovalService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match approval_service.reject(&actor, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Signup rejected"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/pending-users", web::get().to(pending_users))
            .route("/pending-users/{id}/approve", web::post().to(approve_user))
            .route("/pending-users/{id}/reject", web::post().to(reject_user)),
    );
}
