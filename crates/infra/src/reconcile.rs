//! Inventory reconciliation: physical counts against system stock.
//!
//! `compute_divergence` reports what would change and its monetary impact
//! before anything commits; `apply_adjustments` converts a confirmed batch
//! into absolute ledger overwrites with audit/history trails.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;
use stockroom_inventory::{
    AdjustmentBatch, DivergenceReport, UncommittedMovement, compute_divergence,
};

use crate::audit;
use crate::engine::EngineError;
use crate::store::{AuditStore, HistoryStore, ItemStore, StockLedger, StoreError};

/// One successfully applied adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub item_id: ItemId,
    pub code: String,
    pub from: i64,
    pub to: i64,
}

/// One adjustment that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAdjustment {
    pub item_id: ItemId,
    pub error: String,
}

/// Per-item outcome of an adjustment batch.
///
/// Adjustments are independent, non-transactional calls; every outcome is
/// collected so a partially failed batch is fully visible to the caller
/// instead of stopping at the first error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjustmentReport {
    pub applied: Vec<AppliedAdjustment>,
    pub failed: Vec<FailedAdjustment>,
}

impl AdjustmentReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty()
    }
}

/// Converts count batches into ledger adjustments.
pub struct Reconciliation<S> {
    store: Arc<S>,
}

impl<S> Clone for Reconciliation<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Reconciliation<S>
where
    S: ItemStore + StockLedger + HistoryStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Report divergences and monetary impact without committing anything.
    pub async fn compute_divergence(
        &self,
        batch: &AdjustmentBatch,
    ) -> Result<DivergenceReport, EngineError> {
        batch.validate()?;
        let items = self.store.items().await?;
        Ok(compute_divergence(batch, &items))
    }

    /// Apply a confirmed count batch.
    ///
    /// Counts matching system stock are skipped (re-applying a batch is
    /// therefore a natural no-op); unknown items land in `failed`. Each
    /// applied overwrite gets an informational `Adjustment` history record
    /// and an audit entry naming the transition.
    pub async fn apply_adjustments(
        &self,
        batch: &AdjustmentBatch,
        acting_user: &str,
    ) -> Result<AdjustmentReport, EngineError> {
        batch.validate()?;

        let mut report = AdjustmentReport::default();
        for count in &batch.counts {
            let item = match self.store.item(count.item_id).await {
                Ok(Some(item)) => item,
                Ok(None) => {
                    report.failed.push(FailedAdjustment {
                        item_id: count.item_id,
                        error: "item not found".to_string(),
                    });
                    continue;
                }
                // Transport fault on the lookup: report it for this item and
                // keep going; remaining adjustments are independent.
                Err(err) => {
                    report.failed.push(FailedAdjustment {
                        item_id: count.item_id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if item.system_stock() == count.counted {
                continue;
            }

            match self.store.set_absolute(count.item_id, count.counted).await {
                Ok(transition) => {
                    let movement = UncommittedMovement::adjustment(
                        count.item_id,
                        acting_user,
                        Utc::now(),
                        transition.from,
                        transition.to,
                    );
                    if let Err(err) = self.store.append_history(movement).await {
                        tracing::warn!(
                            item = %item.code(),
                            error = %err,
                            "adjustment history append failed; stock overwrite stands"
                        );
                    }
                    audit::record_best_effort(
                        &*self.store,
                        acting_user,
                        &format!(
                            "Adjusted stock of item {}: from {} to {}.",
                            item.code(),
                            transition.from,
                            transition.to
                        ),
                    )
                    .await;
                    report.applied.push(AppliedAdjustment {
                        item_id: count.item_id,
                        code: item.code().as_str().to_string(),
                        from: transition.from,
                        to: transition.to,
                    });
                }
                Err(StoreError::NotFound) => {
                    report.failed.push(FailedAdjustment {
                        item_id: count.item_id,
                        error: "item not found".to_string(),
                    });
                }
                Err(err) => {
                    report.failed.push(FailedAdjustment {
                        item_id: count.item_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            "inventory adjustments processed"
        );
        Ok(report)
    }
}
