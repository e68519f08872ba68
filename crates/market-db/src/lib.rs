//! Relational storage for the market: entities, migrations and repositories

pub mod entities;
pub mod migrator;
pub mod page;
pub mod repositories;
pub mod repository;

pub use page::PageInfo;
pub use repositories::{SeaOrmDealRepository, SeaOrmItemRepository, SeaOrmUserRepository};
pub use repository::{
    DbError, DealRepository, ItemRepository, NewDeal, NewItem, NewUser, UserRepository,
};

#[cfg(any(test, feature = "mock"))]
pub use repository::{MockDealRepository, MockItemRepository, MockUserRepository};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Connect to the database at `database_url`
///
/// In-memory SQLite URLs are pinned to a single pooled connection, otherwise
/// every new connection would see its own empty database.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    Database::connect(options).await
}

/// Apply all pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
