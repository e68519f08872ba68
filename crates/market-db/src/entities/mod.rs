//! Database entities

pub mod deal;
pub mod item;
pub mod user;

pub use deal::Entity as Deal;
pub use item::Entity as Item;
pub use user::Entity as User;

pub mod prelude {
    pub use super::deal::Entity as Deal;
    pub use super::item::Entity as Item;
    pub use super::user::Entity as User;
}
