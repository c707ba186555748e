use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::error::AppError;
use crate::models::*;
use crate::services::AnalyticsService;

fn auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    get,
    path = "/analytics/summary",
    tag = "analytics",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Today's sales summary and weekly trend", body = SalesSummary),
        (status = 403, description = "Account not approved"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn summary(
    analytics_service: web::Data<AnalyticsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match analytics_service.summary(&actor).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/analytics/export",
    tag = "analytics",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Today's per-item sales as a CSV attachment"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn export_csv(
    analytics_service: web::Data<AnalyticsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match analytics_service.export_csv(&actor).await {
        Ok((filename, csv)) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            ))
            .body(csv)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/analytics/reset-today",
    tag = "analytics",
    request_body = ResetTodayRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Today's completed orders deleted", body = ResetTodayResponse),
        (status = 400, description = "Missing confirmation"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn reset_today(
    analytics_service: web::Data<AnalyticsService>,
    req: HttpRequest,
    request: web::Json<ResetTodayRequest>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match analytics_service.reset_today(&actor, request.confirm).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Today's completed orders were removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn analytics_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .route("/summary", web::get().to(summary))
            .route("/export", web::get().to(export_csv))
            .route("/reset-today", web::post().to(reset_today)),
    );
}
