use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::sse::watch_events;
use crate::models::*;
use crate::services::OrderService;

fn auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Blank item name or non-positive quantity"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.create_order(&actor, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    params(
        ("limit" = Option<u64>, Query, description = "Max rows, clamped to 1..=500")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending orders, newest first"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn pending_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.pending_orders(&actor, query.limit).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/today",
    tag = "orders",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Orders completed today, most recent first"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn todays_completed(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.todays_completed(&actor).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/stream",
    tag = "orders",
    params(
        ("view" = Option<OrderView>, Query, description = "pending (default) or completed-today")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Server-sent events, one JSON snapshot per frame"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn stream_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderStreamQuery>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };
    let view = query.view.unwrap_or(OrderView::Pending);

    match order_service.subscribe(&actor, view).await {
        Ok(rx) => Ok(HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("Cache-Control", "no-cache"))
            .streaming(watch_events(rx))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/complete",
    tag = "orders",
    params(
        ("id" = Uuid, Path, description = "Order id")
    ),
    request_body = CompleteOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order completed (idempotent)", body = OrderResponse),
        (status = 400, description = "Completion time outside the allowed range"),
        (status = 404, description = "No such order")
    )
)]
pub async fn complete_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: Option<web::Json<CompleteOrderRequest>>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };
    let request = request.map(web::Json::into_inner).unwrap_or_default();

    match order_service
        .complete_order(&actor, path.into_inner(), request)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    params(
        ("id" = Uuid, Path, description = "Order id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order cancelled and removed"),
        (status = 404, description = "No such order")
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.cancel_order(&actor, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(pending_orders))
            .route("/today", web::get().to(todays_completed))
            .route("/stream", web::get().to(stream_orders))
            .route("/{id}/complete", web::post().to(complete_order))
            .route("/{id}", web::delete().to(cancel_order)),
    );
}
