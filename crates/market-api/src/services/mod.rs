//! Business rules for users, items and deals
//!
//! Every mutating operation on an existing resource goes through the
//! ownership check: the caller's [`Identity`](market_auth::Identity) must
//! match the stored owner before the repository is asked to write.

mod deal;
mod item;
mod user;

pub use deal::DealService;
pub use item::ItemService;
pub use user::UserService;

use market_db::PageInfo;

use crate::error::ServiceError;

pub(crate) fn validate_id(entity: &str, id: i32) -> Result<(), ServiceError> {
    if id <= 0 {
        return Err(ServiceError::Validation(format!("Invalid {} ID", entity)));
    }
    Ok(())
}

pub(crate) fn validate_page(page: PageInfo) -> Result<(), ServiceError> {
    if !page.is_valid() {
        return Err(ServiceError::Validation("Invalid pagination".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_price(price: f64) -> Result<(), ServiceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ServiceError::Validation("Price must be positive".to_string()));
    }
    Ok(())
}
