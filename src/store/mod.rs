pub mod menu_store;
pub mod order_store;

pub use menu_store::*;
pub use order_store::*;

use sea_orm::DbErr;

use crate::error::AppError;

/// Fold driver errors into the two cases callers can act on: a role or
/// grant problem reads as permission denied, anything else as the store
/// being unavailable.
pub(crate) fn store_error(err: DbErr) -> AppError {
    if err.to_string().contains("permission denied") {
        AppError::PermissionDenied
    } else {
        AppError::StoreUnavailable(err)
    }
}
