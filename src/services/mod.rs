pub mod analytics_service;
pub mod approval_service;
pub mod auth_service;
pub mod menu_service;
pub mod order_service;

pub use analytics_service::*;
pub use approval_service::*;
pub use auth_service::*;
pub use menu_service::*;
pub use order_service::*;
