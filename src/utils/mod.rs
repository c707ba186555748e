pub mod csv;
pub mod jwt;
pub mod password;
pub mod time_window;
pub mod validators;

pub use csv::*;
pub use jwt::*;
pub use password::*;
pub use time_window::*;
pub use validators::*;
