use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::OrderStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::order::create_order,
        handlers::order::pending_orders,
        handlers::order::todays_completed,
        handlers::order::stream_orders,
        handlers::order::complete_order,
        handlers::order::cancel_order,
        handlers::menu::list_menu,
        handlers::menu::add_menu_item,
        handlers::menu::remove_menu_item,
        handlers::menu::stream_menu,
        handlers::analytics::summary,
        handlers::analytics::export_csv,
        handlers::analytics::reset_today,
        handlers::admin::pending_users,
        handlers::admin::approve_user,
        handlers::admin::reject_user,
    ),
    components(
        schemas(
            SignupRequest,
            SignupResponse,
            LoginRequest,
            UserResponse,
            AuthResponse,
            PendingUserResponse,
            ApprovedUserResponse,
            CreateOrderRequest,
            CompleteOrderRequest,
            OrderResponse,
            OrderListQuery,
            OrderStatus,
            OrderView,
            OrderStreamQuery,
            AddMenuItemRequest,
            MenuItemResponse,
            DailySalesEntry,
            HourlySlot,
            WeeklySlot,
            SalesSummary,
            ResetTodayRequest,
            ResetTodayResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login and token refresh"),
        (name = "orders", description = "Order lifecycle API"),
        (name = "menu", description = "Menu catalog API"),
        (name = "analytics", description = "Sales summary and export API"),
        (name = "admin", description = "Account approval API"),
    ),
    info(
        title = "Yatai Backend API",
        version = "1.0.0",
        description = "Order-taking backend for a food stall",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
