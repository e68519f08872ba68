//! User entity with stored credentials

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Normalized username (unique)
    #[sea_orm(unique)]
    pub username: String,

    pub email: String,

    /// Argon2id hash of `password + salt`
    pub password_hash: String,

    /// Per-user salt, replaced together with `password_hash`
    pub salt: String,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User owns items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,

    /// User takes part in deals
    #[sea_orm(has_many = "super::deal::Entity")]
    Deals,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
