//! Report service: reads the store, delegates the math to the domain.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockroom_inventory::{
    DashboardSummary, LocationValueRow, MovementRow, StockItem, dashboard_summary, low_stock,
    movement_by_period, value_by_location,
};

use crate::audit::AuditLogEntry;
use crate::engine::EngineError;
use crate::store::{AuditStore, HistoryStore, ItemStore};

pub struct Reports<S> {
    store: Arc<S>,
}

impl<S> Clone for Reports<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Reports<S>
where
    S: ItemStore + HistoryStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Items at or below their reorder threshold.
    pub async fn low_stock(&self) -> Result<Vec<StockItem>, EngineError> {
        let items = self.store.items().await?;
        Ok(low_stock(&items))
    }

    /// All movements joined with item data, filtered by an optional window,
    /// newest-first.
    pub async fn movement_by_period(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MovementRow>, EngineError> {
        let items = self.store.items().await?;
        let history = self.store.all_history().await?;
        Ok(movement_by_period(&history, &items, start, end))
    }

    /// Stock value consolidated per location, descending.
    pub async fn value_by_location(&self) -> Result<Vec<LocationValueRow>, EngineError> {
        let items = self.store.items().await?;
        Ok(value_by_location(&items))
    }

    /// Headline dashboard numbers over an optional window.
    pub async fn dashboard(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DashboardSummary, EngineError> {
        let items = self.store.items().await?;
        let history = self.store.all_history().await?;
        Ok(dashboard_summary(&items, &history, start, end))
    }

    /// Most recent audit entries, newest-first.
    pub async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>, EngineError> {
        Ok(self.store.recent_audit(limit).await?)
    }
}
