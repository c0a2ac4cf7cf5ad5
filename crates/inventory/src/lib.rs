//! Inventory domain module.
//!
//! This crate contains business rules for stock items and movements,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Stock levels change only through the operations defined here;
//! infrastructure wires them to a store.

pub mod history;
pub mod item;
pub mod movement;
pub mod reconcile;
pub mod reports;

pub use history::{HistoryRecord, MovementPayload, UncommittedMovement};
pub use item::{ItemCode, ItemUpdate, NewItem, StockItem, StockTransition, Unit};
pub use movement::{AdjustmentBatch, EntryRequest, ExitRequest, ItemCount, MovementReceipt};
pub use reconcile::{DivergenceLine, DivergenceReport, compute_divergence};
pub use reports::{
    CategoryShare, DashboardSummary, LocationValueRow, MovementRow, TopConsumedRow,
    dashboard_summary, low_stock, movement_by_period, value_by_location,
};
