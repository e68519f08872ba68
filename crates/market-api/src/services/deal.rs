use std::sync::Arc;

use market_auth::Identity;
use market_db::{entities::deal, DealRepository, DbError, ItemRepository, NewDeal, PageInfo};
use tracing::{info, warn};

use super::{validate_id, validate_page, validate_price};
use crate::error::ServiceError;
use crate::models::{NewDealRequest, UpdateDealRequest};

#[derive(Clone)]
pub struct DealService {
    repo: Arc<dyn DealRepository>,
    items: Arc<dyn ItemRepository>,
}

impl DealService {
    pub fn new(repo: Arc<dyn DealRepository>, items: Arc<dyn ItemRepository>) -> Self {
        Self { repo, items }
    }

    /// The referenced item must exist
    async fn ensure_item_exists(&self, item_id: i32) -> Result<(), ServiceError> {
        validate_id("item", item_id)?;

        match self.items.get(item_id).await {
            Ok(_) => Ok(()),
            Err(DbError::NotFound) => Err(ServiceError::NotFound("Item not found".to_string())),
            Err(e) => Err(ServiceError::from_store("Item", e)),
        }
    }

    /// Create a deal made by the caller
    pub async fn create(
        &self,
        request: NewDealRequest,
        caller: &Identity,
    ) -> Result<deal::Model, ServiceError> {
        validate_price(request.price)?;
        self.ensure_item_exists(request.item_id).await?;

        let created = self
            .repo
            .create(NewDeal {
                item_id: request.item_id,
                user_id: caller.user_id,
                price: request.price,
            })
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))?;

        info!(
            "User {} created deal {} on item {}",
            caller.user_id, created.id, created.item_id
        );
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<deal::Model, ServiceError> {
        validate_id("deal", id)?;

        self.repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))
    }

    pub async fn list(&self, page: PageInfo) -> Result<Vec<deal::Model>, ServiceError> {
        validate_page(page)?;

        self.repo
            .get_all(page)
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))
    }

    /// Update a deal the caller made
    ///
    /// The deal's user is rewritten to the caller. After the ownership check
    /// this is always the existing owner.
    pub async fn update(
        &self,
        id: i32,
        request: UpdateDealRequest,
        caller: &Identity,
    ) -> Result<deal::Model, ServiceError> {
        validate_id("deal", id)?;

        let mut deal = self
            .repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))?;

        if !caller.owns(deal.user_id) {
            warn!(
                "User {} tried to update deal {} owned by {}",
                caller.user_id, id, deal.user_id
            );
            return Err(ServiceError::Forbidden(
                "You can only update your own deals".to_string(),
            ));
        }

        validate_price(request.price)?;
        self.ensure_item_exists(request.item_id).await?;

        deal.item_id = request.item_id;
        deal.price = request.price;
        deal.user_id = caller.user_id;

        self.repo
            .update(deal.clone())
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))?;

        Ok(deal)
    }

    pub async fn delete(&self, id: i32, caller: &Identity) -> Result<(), ServiceError> {
        validate_id("deal", id)?;

        let deal = self
            .repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))?;

        if !caller.owns(deal.user_id) {
            warn!(
                "User {} tried to delete deal {} owned by {}",
                caller.user_id, id, deal.user_id
            );
            return Err(ServiceError::Forbidden(
                "You can only delete your own deals".to_string(),
            ));
        }

        self.repo
            .delete(id)
            .await
            .map_err(|e| ServiceError::from_store("Deal", e))?;

        info!("User {} deleted deal {}", caller.user_id, id);
        Ok(())
    }
}
