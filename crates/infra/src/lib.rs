//! Infrastructure for the stockroom core: persistence collaborator traits,
//! the in-memory store, and the services that orchestrate them.
//!
//! Layering mirrors the domain split: `stockroom-inventory` and
//! `stockroom-parties` stay pure; everything that touches a store lives
//! here. Services compose store traits, so production code and tests can
//! swap implementations freely.

pub mod audit;
pub mod backup;
pub mod catalog;
pub mod directory;
pub mod engine;
pub mod reconcile;
pub mod reports;
pub mod store;


pub use audit::AuditLogEntry;
pub use backup::{BackupService, Snapshot};
pub use catalog::Catalog;
pub use directory::Directory;
pub use engine::{EngineError, MovementEngine};
pub use reconcile::{AdjustmentReport, AppliedAdjustment, FailedAdjustment, Reconciliation};
pub use reports::Reports;
pub use store::{
    AuditStore, DirectoryStore, HistoryStore, InMemoryStore, ItemStore, SnapshotStore,
    StockLedger, StoreError,
};
