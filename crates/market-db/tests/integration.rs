//! Integration tests for market-db
//!
//! Tests repository operations with real SQLite in-memory database

use market_db::{
    connect, migrate, DbError, DealRepository, ItemRepository, NewDeal, NewItem, NewUser,
    PageInfo, SeaOrmDealRepository, SeaOrmItemRepository, SeaOrmUserRepository, UserRepository,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        salt: "c2FsdHNhbHRzYWx0c2FsdA".to_string(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_and_get_user() {
    let db = setup_test_db().await;
    let repo = SeaOrmUserRepository::new(db);

    let created = repo.create(new_user("alice")).await.unwrap();
    assert!(created.id > 0);

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.email, "alice@example.com");

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, created.id);
}

#[tokio::test]
async fn test_get_missing_user_is_not_found() {
    let db = setup_test_db().await;
    let repo = SeaOrmUserRepository::new(db);

    assert!(matches!(repo.get(999).await, Err(DbError::NotFound)));
    assert!(matches!(
        repo.get_by_username("nobody").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn test_duplicate_username_is_unique_violation() {
    let db = setup_test_db().await;
    let repo = SeaOrmUserRepository::new(db);

    repo.create(new_user("alice")).await.unwrap();
    let result = repo.create(new_user("alice")).await;

    assert!(matches!(result, Err(DbError::UniqueViolation(_))));
}

#[tokio::test]
async fn test_update_user_replaces_credential_columns() {
    let db = setup_test_db().await;
    let repo = SeaOrmUserRepository::new(db);

    let mut user = repo.create(new_user("alice")).await.unwrap();
    user.password_hash = "new-hash".to_string();
    user.salt = "new-salt".to_string();
    repo.update(user.clone()).await.unwrap();

    let fetched = repo.get(user.id).await.unwrap();
    assert_eq!(fetched.password_hash, "new-hash");
    assert_eq!(fetched.salt, "new-salt");
}

#[tokio::test]
async fn test_delete_user() {
    let db = setup_test_db().await;
    let repo = SeaOrmUserRepository::new(db);

    let user = repo.create(new_user("alice")).await.unwrap();
    repo.delete(user.id).await.unwrap();

    assert!(matches!(repo.get(user.id).await, Err(DbError::NotFound)));
    assert!(matches!(repo.delete(user.id).await, Err(DbError::NotFound)));
}

#[tokio::test]
async fn test_get_all_paginates_by_offset() {
    let db = setup_test_db().await;
    let users = SeaOrmUserRepository::new(db.clone());
    let items = SeaOrmItemRepository::new(db);

    let owner = users.create(new_user("alice")).await.unwrap();
    for i in 1..=25 {
        items
            .create(NewItem {
                name: format!("item {}", i),
                price: i as f64,
                owner_id: owner.id,
            })
            .await
            .unwrap();
    }

    let page2 = items.get_all(PageInfo::new(2, 10)).await.unwrap();
    assert_eq!(page2.len(), 10);
    assert_eq!(page2[0].name, "item 11");

    let page3 = items.get_all(PageInfo::new(3, 10)).await.unwrap();
    assert_eq!(page3.len(), 5);

    let empty = items.get_all(PageInfo::new(1, 0)).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_item_update_keeps_owner() {
    let db = setup_test_db().await;
    let users = SeaOrmUserRepository::new(db.clone());
    let items = SeaOrmItemRepository::new(db);

    let alice = users.create(new_user("alice")).await.unwrap();
    let bob = users.create(new_user("bob")).await.unwrap();

    let mut item = items
        .create(NewItem {
            name: "lamp".to_string(),
            price: 10.0,
            owner_id: alice.id,
        })
        .await
        .unwrap();

    item.name = "desk lamp".to_string();
    item.owner_id = bob.id;
    items.update(item.clone()).await.unwrap();

    let fetched = items.get(item.id).await.unwrap();
    assert_eq!(fetched.name, "desk lamp");
    assert_eq!(fetched.owner_id, alice.id);
}

#[tokio::test]
async fn test_update_missing_item_is_not_found() {
    let db = setup_test_db().await;
    let users = SeaOrmUserRepository::new(db.clone());
    let items = SeaOrmItemRepository::new(db);

    let alice = users.create(new_user("alice")).await.unwrap();
    let mut item = items
        .create(NewItem {
            name: "lamp".to_string(),
            price: 10.0,
            owner_id: alice.id,
        })
        .await
        .unwrap();
    items.delete(item.id).await.unwrap();

    item.name = "ghost".to_string();
    assert!(matches!(items.update(item).await, Err(DbError::NotFound)));
}

#[tokio::test]
async fn test_deal_crud() {
    let db = setup_test_db().await;
    let users = SeaOrmUserRepository::new(db.clone());
    let items = SeaOrmItemRepository::new(db.clone());
    let deals = SeaOrmDealRepository::new(db);

    let alice = users.create(new_user("alice")).await.unwrap();
    let item = items
        .create(NewItem {
            name: "lamp".to_string(),
            price: 10.0,
            owner_id: alice.id,
        })
        .await
        .unwrap();

    let mut deal = deals
        .create(NewDeal {
            item_id: item.id,
            user_id: alice.id,
            price: 9.5,
        })
        .await
        .unwrap();
    assert_eq!(deals.get(deal.id).await.unwrap().price, 9.5);

    deal.price = 8.0;
    deals.update(deal.clone()).await.unwrap();
    assert_eq!(deals.get(deal.id).await.unwrap().price, 8.0);

    assert_eq!(deals.get_all(PageInfo::new(1, 10)).await.unwrap().len(), 1);

    deals.delete(deal.id).await.unwrap();
    assert!(matches!(deals.get(deal.id).await, Err(DbError::NotFound)));
}

#[tokio::test]
async fn test_deleting_user_cascades_to_items() {
    let db = setup_test_db().await;
    let users = SeaOrmUserRepository::new(db.clone());
    let items = SeaOrmItemRepository::new(db);

    let alice = users.create(new_user("alice")).await.unwrap();
    let item = items
        .create(NewItem {
            name: "lamp".to_string(),
            price: 10.0,
            owner_id: alice.id,
        })
        .await
        .unwrap();

    users.delete(alice.id).await.unwrap();

    assert!(matches!(items.get(item.id).await, Err(DbError::NotFound)));
}
