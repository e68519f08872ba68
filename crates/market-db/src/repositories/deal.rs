use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use crate::entities::deal;
use crate::page::PageInfo;
use crate::repository::{DbError, DealRepository, NewDeal};

pub struct SeaOrmDealRepository {
    db: DatabaseConnection,
}

impl SeaOrmDealRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealRepository for SeaOrmDealRepository {
    async fn create(&self, new_deal: NewDeal) -> Result<deal::Model, DbError> {
        let active = deal::ActiveModel {
            item_id: Set(new_deal.item_id),
            user_id: Set(new_deal.user_id),
            price: Set(new_deal.price),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(active.insert(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<deal::Model, DbError> {
        deal::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_all(&self, page: PageInfo) -> Result<Vec<deal::Model>, DbError> {
        Ok(deal::Entity::find()
            .order_by_asc(deal::Column::Id)
            .offset(page.offset() as u64)
            .limit(page.page_size as u64)
            .all(&self.db)
            .await?)
    }

    async fn update(&self, model: deal::Model) -> Result<(), DbError> {
        let active = deal::ActiveModel {
            id: Set(model.id),
            item_id: Set(model.item_id),
            user_id: Set(model.user_id),
            price: Set(model.price),
            ..Default::default()
        };

        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = deal::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
