//! Movement engine: the transactional core.
//!
//! Validates a movement request end-to-end and applies it as one logical
//! unit — ledger mutation, history append, audit append. Two terminal
//! outcomes per request: **Applied** (`Ok` with a receipt) or **Rejected**
//! (`Err` carrying the business error).
//!
//! ## Pipeline
//!
//! ```text
//! Request
//!   ↓
//! 1. Validate the request shape (positive quantity)
//!   ↓
//! 2. Resolve the item (reject with NotFound otherwise)
//!   ↓
//! 3. Mutate the ledger (conditional decrement for exits)
//!   ↓
//! 4. Append the paired history record
//!   ↓
//! 5. Append the audit entry (best-effort)
//!   ↓
//! Receipt with the new stock level
//! ```
//!
//! ## Failure atomicity
//!
//! A rejection at steps 1–3 leaves every store untouched. If the history
//! append (step 4) fails after the ledger committed, the engine compensates
//! by reversing the ledger mutation; when the compensation itself fails the
//! inconsistency is surfaced as [`EngineError::PartialFailure`] naming the
//! committed delta, so an operator can reconcile stock against history. A
//! partial failure is never silently discarded.
//!
//! Audit failures never affect the outcome (see [`crate::audit`]).

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{EntryRequest, ExitRequest, MovementReceipt, UncommittedMovement};

use crate::audit;
use crate::store::{AuditStore, HistoryStore, ItemStore, StockLedger, StoreError};

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rejection; no state changed. Not automatically retryable —
    /// it represents a caller mistake.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The persistence collaborator failed and the operation did not commit
    /// (or was fully compensated). The caller may retry.
    #[error("persistence failure: {0}")]
    Transport(String),

    /// The ledger mutation committed but a dependent write failed and could
    /// not be compensated. Stock and history disagree until an operator
    /// reconciles them.
    #[error("partial failure on item {item_id}: ledger committed delta {committed_delta} but {reason}")]
    PartialFailure {
        item_id: ItemId,
        committed_delta: i64,
        reason: String,
    },
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => EngineError::Domain(DomainError::not_found("item")),
            StoreError::InsufficientStock {
                available,
                requested,
            } => EngineError::Domain(DomainError::insufficient_stock(available, requested)),
            StoreError::InvalidRequest(msg) => EngineError::Domain(DomainError::validation(msg)),
            StoreError::Transport(msg) => EngineError::Transport(msg),
        }
    }
}

/// Applies entry/exit movements against the ledger, pairing each accepted
/// movement with exactly one history record and one audit entry.
pub struct MovementEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for MovementEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> MovementEngine<S>
where
    S: ItemStore + StockLedger + HistoryStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a stock entry.
    pub async fn register_entry(
        &self,
        request: EntryRequest,
        acting_user: &str,
    ) -> Result<MovementReceipt, EngineError> {
        request.validate()?;
        let item = self
            .store
            .item(request.item_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("item {}", request.item_id)))?;

        let stock_level = self.store.increment(request.item_id, request.quantity).await?;

        let movement = UncommittedMovement::entry(
            request.item_id,
            request.quantity,
            acting_user,
            Utc::now(),
            request.details(),
        );
        let record = match self.store.append_history(movement).await {
            Ok(record) => record,
            Err(cause) => {
                return Err(self
                    .compensate(request.item_id, request.quantity, cause)
                    .await);
            }
        };

        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!(
                "Recorded entry of {} unit(s) of item {}. Invoice: {}.",
                request.quantity,
                item.code(),
                request.invoice_label()
            ),
        )
        .await;

        tracing::info!(
            item = %item.code(),
            quantity = request.quantity,
            stock = stock_level,
            "stock entry applied"
        );
        Ok(MovementReceipt {
            item_id: request.item_id,
            code: item.code().clone(),
            history_id: record.id,
            quantity: request.quantity,
            stock_level,
        })
    }

    /// Register a stock exit.
    ///
    /// The sufficiency check is atomic with the decrement at the store
    /// layer, so concurrent exits on the same item serialize instead of
    /// racing stock below zero.
    pub async fn register_exit(
        &self,
        request: ExitRequest,
        acting_user: &str,
    ) -> Result<MovementReceipt, EngineError> {
        request.validate()?;
        let item = self
            .store
            .item(request.item_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("item {}", request.item_id)))?;

        let stock_level = self.store.decrement(request.item_id, request.quantity).await?;

        let movement = UncommittedMovement::exit(
            request.item_id,
            request.quantity,
            acting_user,
            Utc::now(),
            request.requester.clone(),
            request.responsible.clone(),
        );
        let record = match self.store.append_history(movement).await {
            Ok(record) => record,
            Err(cause) => {
                return Err(self
                    .compensate(request.item_id, -request.quantity, cause)
                    .await);
            }
        };

        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!(
                "Recorded exit of {} unit(s) of item {} for {}.",
                request.quantity,
                item.code(),
                request.requester
            ),
        )
        .await;

        tracing::info!(
            item = %item.code(),
            quantity = request.quantity,
            stock = stock_level,
            "stock exit applied"
        );
        Ok(MovementReceipt {
            item_id: request.item_id,
            code: item.code().clone(),
            history_id: record.id,
            quantity: request.quantity,
            stock_level,
        })
    }

    /// Reverse a committed ledger delta after a failed history append.
    ///
    /// Returns the error to surface: `Transport` when the rollback restored
    /// the previous level, `PartialFailure` when stock and history are left
    /// out of step.
    async fn compensate(
        &self,
        item_id: ItemId,
        committed_delta: i64,
        cause: StoreError,
    ) -> EngineError {
        let rollback = if committed_delta > 0 {
            self.store.decrement(item_id, committed_delta).await.map(|_| ())
        } else {
            self.store.increment(item_id, -committed_delta).await.map(|_| ())
        };
        match rollback {
            Ok(()) => {
                tracing::warn!(
                    %item_id,
                    committed_delta,
                    error = %cause,
                    "history append failed; ledger mutation rolled back"
                );
                EngineError::Transport(format!("history append failed: {cause}"))
            }
            Err(rollback_err) => {
                tracing::error!(
                    %item_id,
                    committed_delta,
                    error = %cause,
                    rollback_error = %rollback_err,
                    "history append failed and compensation failed; stock and history disagree"
                );
                EngineError::PartialFailure {
                    item_id,
                    committed_delta,
                    reason: format!(
                        "history append failed ({cause}) and compensation failed ({rollback_err})"
                    ),
                }
            }
        }
    }
}
