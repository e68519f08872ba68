use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::user;
use crate::page::PageInfo;
use crate::repository::{DbError, NewUser, UserRepository};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<user::Model, DbError> {
        let active = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            salt: Set(new_user.salt),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(active.insert(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<user::Model, DbError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<user::Model, DbError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_all(&self, page: PageInfo) -> Result<Vec<user::Model>, DbError> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Id)
            .offset(page.offset() as u64)
            .limit(page.page_size as u64)
            .all(&self.db)
            .await?)
    }

    async fn update(&self, model: user::Model) -> Result<(), DbError> {
        let active = user::ActiveModel {
            id: Set(model.id),
            username: Set(model.username),
            email: Set(model.email),
            password_hash: Set(model.password_hash),
            salt: Set(model.salt),
            ..Default::default()
        };

        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
