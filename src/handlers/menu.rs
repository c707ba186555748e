use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::sse::watch_events;
use crate::models::*;
use crate::services::MenuService;

fn auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    get,
    path = "/menu",
    tag = "menu",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Catalog in insertion order"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn list_menu(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match menu_service.list(&actor).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/menu",
    tag = "menu",
    request_body = AddMenuItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Item added", body = MenuItemResponse),
        (status = 400, description = "Blank name, negative price or duplicate item"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn add_menu_item(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    request: web::Json<AddMenuItemRequest>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match menu_service.add_item(&actor, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/menu/{id}",
    tag = "menu",
    params(
        ("id" = Uuid, Path, description = "Menu item id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Item removed; existing orders for it survive"),
        (status = 404, description = "No such item")
    )
)]
pub async fn remove_menu_item(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match menu_service.remove_item(&actor, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Menu item removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/stream",
    tag = "menu",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Server-sent events, one catalog snapshot per frame"),
        (status = 403, description = "Account not approved")
    )
)]
pub async fn stream_menu(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match auth_user(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match menu_service.subscribe(&actor).await {
        Ok(rx) => Ok(HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("Cache-Control", "no-cache"))
            .streaming(watch_events(rx))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn menu_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/menu")
            .route("", web::get().to(list_menu))
            .route("", web::post().to(add_menu_item))
            .route("/stream", web::get().to(stream_menu))
            .route("/{id}", web::delete().to(remove_menu_item)),
    );
}
