//! SeaORM-backed repositories

mod deal;
mod item;
mod user;

pub use deal::SeaOrmDealRepository;
pub use item::SeaOrmItemRepository;
pub use user::SeaOrmUserRepository;
