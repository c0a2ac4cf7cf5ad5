//! Persistence collaborator traits.
//!
//! The core is store-agnostic: services compose these traits, and either the
//! in-memory store (tests/dev) or a remote client (production) satisfies
//! them. All calls are asynchronous because a real implementation may be a
//! network round trip; callers await completion before reporting success.
//!
//! ## Error boundary
//!
//! [`StoreError`] carries both storage-level rejections the store itself can
//! decide (`NotFound`, `InsufficientStock`) and transport failures. Services
//! translate these into the domain/engine taxonomy so that business
//! rejections stay distinct from infrastructure faults.
//!
//! ## Ledger semantics
//!
//! The three ledger primitives are the **only** writers of `system_stock`:
//!
//! - `increment` adds to the level, no upper bound
//! - `decrement` subtracts only if the result stays non-negative; the
//!   check-then-mutate sequence is atomic inside the store, so two
//!   concurrent exits cannot both pass the sufficiency check against a
//!   stale value
//! - `set_absolute` overwrites unconditionally (a confirmed physical count
//!   is authoritative)
//!
//! None of them writes history or audit entries; callers own that ordering.

mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use stockroom_core::{ItemId, SupplierId, UserId};
use stockroom_inventory::{
    HistoryRecord, ItemCode, StockItem, StockTransition, UncommittedMovement,
};
use stockroom_parties::{Supplier, User};

use crate::audit::AuditLogEntry;
use crate::backup::Snapshot;

pub use memory::InMemoryStore;

/// Store operation error.
///
/// Storage-level rejections are distinct variants so callers can map them
/// back onto the domain taxonomy; everything environmental (network, lock
/// poisoning, backend unavailability) is `Transport`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted record does not exist.
    #[error("record not found")]
    NotFound,

    /// A conditional decrement would drive stock negative. State unchanged.
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Malformed input reached the store (e.g. a non-positive history
    /// quantity).
    #[error("invalid store request: {0}")]
    InvalidRequest(String),

    /// The underlying persistence call failed (network/storage).
    #[error("storage transport failure: {0}")]
    Transport(String),
}

/// Catalog persistence: stock item read/query and full-record writes.
///
/// `update_item` replaces the stored record wholesale; services are expected
/// to have gone through the domain mutators first, never to fabricate stock
/// levels (the ledger primitives own `system_stock`).
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert_item(&self, item: StockItem) -> Result<(), StoreError>;

    async fn item(&self, id: ItemId) -> Result<Option<StockItem>, StoreError>;

    /// Case-insensitive code lookup.
    async fn item_by_code(&self, code: &ItemCode) -> Result<Option<StockItem>, StoreError>;

    /// Full catalog, ordered by code.
    async fn items(&self) -> Result<Vec<StockItem>, StoreError>;

    /// Replace the stored record. `NotFound` if the item is unknown.
    async fn update_item(&self, item: StockItem) -> Result<(), StoreError>;

    /// Remove the item. Its history stays behind, keyed by item id.
    async fn remove_item(&self, id: ItemId) -> Result<(), StoreError>;
}

/// The authoritative `system_stock` mutation primitives.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Add `qty` (> 0) units. Returns the new level.
    async fn increment(&self, id: ItemId, qty: i64) -> Result<i64, StoreError>;

    /// Subtract `qty` (> 0) units only if the result stays non-negative;
    /// otherwise `InsufficientStock` with no state change. Atomic with the
    /// sufficiency check.
    async fn decrement(&self, id: ItemId, qty: i64) -> Result<i64, StoreError>;

    /// Overwrite the level with `new_qty` (>= 0). Reconciliation only.
    async fn set_absolute(
        &self,
        id: ItemId,
        new_qty: i64,
    ) -> Result<StockTransition, StoreError>;
}

/// Append-only movement history, scoped per item.
///
/// Implementations must:
/// - validate the movement (positive quantity) before assigning identity
/// - assign monotonically increasing per-item sequence numbers
/// - expose no update or delete
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a movement, assigning id + sequence. Returns the stored record.
    async fn append_history(
        &self,
        movement: UncommittedMovement,
    ) -> Result<HistoryRecord, StoreError>;

    /// Full history for one item, newest-first. Re-querying always returns
    /// the full current set.
    async fn history_for(&self, item_id: ItemId) -> Result<Vec<HistoryRecord>, StoreError>;

    /// Every record in the store, for reports and export.
    async fn all_history(&self) -> Result<Vec<HistoryRecord>, StoreError>;
}

/// Process-wide append-only audit log, newest-first on read.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an entry, assigning id + timestamp. Returns the stored entry.
    async fn append_audit(&self, user: &str, action: &str) -> Result<AuditLogEntry, StoreError>;

    /// Most recent entries, newest-first.
    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError>;
}

/// Users and suppliers.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// Lookup by normalized (lowercased) email.
    async fn user_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError>;
    async fn users(&self) -> Result<Vec<User>, StoreError>;
    async fn update_user(&self, user: User) -> Result<(), StoreError>;
    async fn remove_user(&self, id: UserId) -> Result<(), StoreError>;

    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError>;
    async fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;
    async fn suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    async fn update_supplier(&self, supplier: Supplier) -> Result<(), StoreError>;
    async fn remove_supplier(&self, id: SupplierId) -> Result<(), StoreError>;
}

/// Whole-dataset export and replacement, for backup/restore.
///
/// `replace_all` swaps in the snapshot atomically — nothing is merged. The
/// caller validates the snapshot first; the store only stores.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;
    async fn replace_all(&self, snapshot: Snapshot) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn insert_item(&self, item: StockItem) -> Result<(), StoreError> {
        (**self).insert_item(item).await
    }

    async fn item(&self, id: ItemId) -> Result<Option<StockItem>, StoreError> {
        (**self).item(id).await
    }

    async fn item_by_code(&self, code: &ItemCode) -> Result<Option<StockItem>, StoreError> {
        (**self).item_by_code(code).await
    }

    async fn items(&self) -> Result<Vec<StockItem>, StoreError> {
        (**self).items().await
    }

    async fn update_item(&self, item: StockItem) -> Result<(), StoreError> {
        (**self).update_item(item).await
    }

    async fn remove_item(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).remove_item(id).await
    }
}

#[async_trait]
impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    async fn increment(&self, id: ItemId, qty: i64) -> Result<i64, StoreError> {
        (**self).increment(id, qty).await
    }

    async fn decrement(&self, id: ItemId, qty: i64) -> Result<i64, StoreError> {
        (**self).decrement(id, qty).await
    }

    async fn set_absolute(
        &self,
        id: ItemId,
        new_qty: i64,
    ) -> Result<StockTransition, StoreError> {
        (**self).set_absolute(id, new_qty).await
    }
}

#[async_trait]
impl<S> HistoryStore for Arc<S>
where
    S: HistoryStore + ?Sized,
{
    async fn append_history(
        &self,
        movement: UncommittedMovement,
    ) -> Result<HistoryRecord, StoreError> {
        (**self).append_history(movement).await
    }

    async fn history_for(&self, item_id: ItemId) -> Result<Vec<HistoryRecord>, StoreError> {
        (**self).history_for(item_id).await
    }

    async fn all_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        (**self).all_history().await
    }
}

#[async_trait]
impl<S> AuditStore for Arc<S>
where
    S: AuditStore + ?Sized,
{
    async fn append_audit(&self, user: &str, action: &str) -> Result<AuditLogEntry, StoreError> {
        (**self).append_audit(user, action).await
    }

    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        (**self).recent_audit(limit).await
    }
}
