//! Catalog service: stock item lifecycle.
//!
//! Creation seeds `system_stock` from the initial count; updates never touch
//! the stock level (only movements and reconciliation do); deletion keeps
//! the item's history behind for audit purposes.

use std::sync::Arc;

use stockroom_core::{DomainError, Entity, ItemId};
use stockroom_inventory::{HistoryRecord, ItemCode, ItemUpdate, NewItem, StockItem};

use crate::audit;
use crate::engine::EngineError;
use crate::store::{AuditStore, HistoryStore, ItemStore};

pub struct Catalog<S> {
    store: Arc<S>,
}

impl<S> Clone for Catalog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Catalog<S>
where
    S: ItemStore + HistoryStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new item. Codes are unique case-insensitively.
    pub async fn create_item(
        &self,
        input: NewItem,
        acting_user: &str,
    ) -> Result<StockItem, EngineError> {
        let item = StockItem::new(ItemId::new(), input)?;
        if self.store.item_by_code(item.code()).await?.is_some() {
            return Err(DomainError::duplicate_code(item.code().as_str()).into());
        }
        self.store.insert_item(item.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Created item {}.", item.code()),
        )
        .await;
        tracing::info!(item = %item.code(), stock = item.system_stock(), "item created");
        Ok(item)
    }

    /// Update descriptive fields. The stock level is preserved as-is.
    pub async fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
        acting_user: &str,
    ) -> Result<StockItem, EngineError> {
        let mut item = self
            .store
            .item(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;

        let new_code = ItemCode::new(update.code.clone())?;
        if let Some(existing) = self.store.item_by_code(&new_code).await? {
            if *existing.id() != id {
                return Err(DomainError::duplicate_code(new_code.as_str()).into());
            }
        }

        item.update_details(update)?;
        self.store.update_item(item.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Updated item {}.", item.code()),
        )
        .await;
        Ok(item)
    }

    /// Delete the item. History records stay, keyed by the now-unresolvable
    /// item id.
    pub async fn delete_item(&self, id: ItemId, acting_user: &str) -> Result<(), EngineError> {
        let item = self
            .store
            .item(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
        self.store.remove_item(id).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Deleted item {}.", item.code()),
        )
        .await;
        tracing::info!(item = %item.code(), "item deleted");
        Ok(())
    }

    pub async fn item(&self, id: ItemId) -> Result<Option<StockItem>, EngineError> {
        Ok(self.store.item(id).await?)
    }

    pub async fn items(&self) -> Result<Vec<StockItem>, EngineError> {
        Ok(self.store.items().await?)
    }

    /// Movement history for one item, newest-first.
    pub async fn history(&self, id: ItemId) -> Result<Vec<HistoryRecord>, EngineError> {
        Ok(self.store.history_for(id).await?)
    }
}
