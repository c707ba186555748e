pub mod approved_users;
pub mod menu_items;
pub mod orders;
pub mod pending_users;
pub mod users;

pub use approved_users as approved_user_entity;
pub use menu_items as menu_item_entity;
pub use orders as order_entity;
pub use pending_users as pending_user_entity;
pub use users as user_entity;

pub use orders::OrderStatus;
