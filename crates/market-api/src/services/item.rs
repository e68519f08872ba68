use std::sync::Arc;

use market_auth::Identity;
use market_db::{entities::item, ItemRepository, NewItem, PageInfo};
use tracing::{info, warn};

use super::{validate_id, validate_page, validate_price};
use crate::error::ServiceError;
use crate::models::{NewItemRequest, UpdateItemRequest};
use crate::normalize::normalize_name;

#[derive(Clone)]
pub struct ItemService {
    repo: Arc<dyn ItemRepository>,
}

impl ItemService {
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    fn checked_name(raw: &str) -> Result<String, ServiceError> {
        let name = normalize_name(raw);
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "Item name cannot be empty".to_string(),
            ));
        }
        Ok(name)
    }

    /// Create an item owned by the caller
    pub async fn create(
        &self,
        request: NewItemRequest,
        caller: &Identity,
    ) -> Result<item::Model, ServiceError> {
        let name = Self::checked_name(&request.name)?;
        validate_price(request.price)?;

        let created = self
            .repo
            .create(NewItem {
                name,
                price: request.price,
                owner_id: caller.user_id,
            })
            .await
            .map_err(|e| ServiceError::from_store("Item", e))?;

        info!("User {} created item {}", caller.user_id, created.id);
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<item::Model, ServiceError> {
        validate_id("item", id)?;

        self.repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Item", e))
    }

    pub async fn list(&self, page: PageInfo) -> Result<Vec<item::Model>, ServiceError> {
        validate_page(page)?;

        self.repo
            .get_all(page)
            .await
            .map_err(|e| ServiceError::from_store("Item", e))
    }

    /// Update name and price of an item the caller owns
    pub async fn update(
        &self,
        id: i32,
        request: UpdateItemRequest,
        caller: &Identity,
    ) -> Result<item::Model, ServiceError> {
        validate_id("item", id)?;

        let mut item = self
            .repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Item", e))?;

        if !caller.owns(item.owner_id) {
            warn!(
                "User {} tried to update item {} owned by {}",
                caller.user_id, id, item.owner_id
            );
            return Err(ServiceError::Forbidden(
                "You can only update your own items".to_string(),
            ));
        }

        item.name = Self::checked_name(&request.name)?;
        validate_price(request.price)?;
        item.price = request.price;

        self.repo
            .update(item.clone())
            .await
            .map_err(|e| ServiceError::from_store("Item", e))?;

        Ok(item)
    }

    pub async fn delete(&self, id: i32, caller: &Identity) -> Result<(), ServiceError> {
        validate_id("item", id)?;

        let item = self
            .repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Item", e))?;

        if !caller.owns(item.owner_id) {
            warn!(
                "User {} tried to delete item {} owned by {}",
                caller.user_id, id, item.owner_id
            );
            return Err(ServiceError::Forbidden(
                "You can only delete your own items".to_string(),
            ));
        }

        self.repo
            .delete(id)
            .await
            .map_err(|e| ServiceError::from_store("Item", e))?;

        info!("User {} deleted item {}", caller.user_id, id);
        Ok(())
    }
}
