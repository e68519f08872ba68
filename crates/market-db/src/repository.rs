//! Repository contracts for users, items and deals
//!
//! Services depend on these traits only. The SeaORM implementations live in
//! [`crate::repositories`]; tests can substitute the generated mocks.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::entities::{deal, item, user};
use crate::page::PageInfo;

/// Storage errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Requested row does not exist
    #[error("Record not found")]
    NotFound,

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => DbError::NotFound,
            other => match other.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => DbError::UniqueViolation(msg),
                _ => DbError::Database(other),
            },
        }
    }
}

/// User row to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Item row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub owner_id: i32,
}

/// Deal row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeal {
    pub item_id: i32,
    pub user_id: i32,
    pub price: f64,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<user::Model, DbError>;
    async fn get(&self, id: i32) -> Result<user::Model, DbError>;
    async fn get_by_username(&self, username: &str) -> Result<user::Model, DbError>;
    async fn get_all(&self, page: PageInfo) -> Result<Vec<user::Model>, DbError>;
    async fn update(&self, user: user::Model) -> Result<(), DbError>;
    async fn delete(&self, id: i32) -> Result<(), DbError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, item: NewItem) -> Result<item::Model, DbError>;
    async fn get(&self, id: i32) -> Result<item::Model, DbError>;
    async fn get_all(&self, page: PageInfo) -> Result<Vec<item::Model>, DbError>;
    async fn update(&self, item: item::Model) -> Result<(), DbError>;
    async fn delete(&self, id: i32) -> Result<(), DbError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DealRepository: Send + Sync {
    async fn create(&self, deal: NewDeal) -> Result<deal::Model, DbError>;
    async fn get(&self, id: i32) -> Result<deal::Model, DbError>;
    async fn get_all(&self, page: PageInfo) -> Result<Vec<deal::Model>, DbError>;
    async fn update(&self, deal: deal::Model) -> Result<(), DbError>;
    async fn delete(&self, id: i32) -> Result<(), DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err = DbError::from(DbErr::RecordNotFound("users".to_string()));
        assert!(matches!(err, DbError::NotFound));

        let err = DbError::from(DbErr::RecordNotUpdated);
        assert!(matches!(err, DbError::NotFound));
    }

    #[test]
    fn test_other_errors_map_to_database() {
        let err = DbError::from(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, DbError::Database(_)));
    }

    #[tokio::test]
    async fn test_mock_repository_records_page() {
        let mut repo = MockItemRepository::new();
        repo.expect_get_all()
            .withf(|page| page.offset() == 10 && page.page_size == 10)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let items = repo.get_all(PageInfo::new(2, 10)).await.unwrap();
        assert!(items.is_empty());
    }
}
