pub mod admin;
pub mod analytics;
pub mod auth;
pub mod menu;
pub mod order;
pub mod sse;

pub use admin::admin_config;
pub use analytics::analytics_config;
pub use auth::auth_config;
pub use menu::menu_config;
pub use order::order_config;
