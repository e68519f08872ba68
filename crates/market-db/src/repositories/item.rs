use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use crate::entities::item;
use crate::page::PageInfo;
use crate::repository::{DbError, ItemRepository, NewItem};

pub struct SeaOrmItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn create(&self, new_item: NewItem) -> Result<item::Model, DbError> {
        let active = item::ActiveModel {
            name: Set(new_item.name),
            price: Set(new_item.price),
            owner_id: Set(new_item.owner_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(active.insert(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<item::Model, DbError> {
        item::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_all(&self, page: PageInfo) -> Result<Vec<item::Model>, DbError> {
        Ok(item::Entity::find()
            .order_by_asc(item::Column::Id)
            .offset(page.offset() as u64)
            .limit(page.page_size as u64)
            .all(&self.db)
            .await?)
    }

    async fn update(&self, model: item::Model) -> Result<(), DbError> {
        // owner_id is left NotSet: ownership never changes after creation
        let active = item::ActiveModel {
            id: Set(model.id),
            name: Set(model.name),
            price: Set(model.price),
            ..Default::default()
        };

        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = item::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
