//! Backup and restore.
//!
//! A snapshot captures the whole data set; restore validates it as a unit
//! and then replaces everything atomically. Nothing is merged: after a
//! restore, every ledger/history/audit invariant holds for the restored
//! data alone.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{HistoryRecord, ItemCode, StockItem};
use stockroom_parties::{Supplier, User};

use crate::audit::{self, AuditLogEntry};
use crate::engine::EngineError;
use crate::store::{AuditStore, SnapshotStore};

/// Full-system snapshot, serializable for external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<StockItem>,
    pub users: Vec<User>,
    pub suppliers: Vec<Supplier>,
    pub history: Vec<HistoryRecord>,
    pub audit: Vec<AuditLogEntry>,
}

impl Snapshot {
    /// Validate the snapshot as a whole. A snapshot that fails here is
    /// rejected wholesale; nothing is restored from it.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut codes = HashSet::new();
        for item in &self.items {
            // Deserialization bypasses the domain constructors, so re-check
            // what they would have enforced.
            ItemCode::new(item.code().as_str())?;
            if item.system_stock() < 0 {
                bail!(
                    "item {}: negative system stock {}",
                    item.code(),
                    item.system_stock()
                );
            }
            if item.min_stock() < 0 || item.unit_value_cents() < 0 {
                bail!("item {}: negative minimum stock or unit value", item.code());
            }
            if !codes.insert(item.code().normalized()) {
                bail!("duplicate item code: {}", item.code());
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            if !emails.insert(user.normalized_email()) {
                bail!("duplicate user email: {}", user.email());
            }
        }

        let mut last_seq: HashMap<ItemId, u64> = HashMap::new();
        for record in &self.history {
            if record.quantity <= 0 {
                bail!(
                    "history record {}: non-positive quantity {}",
                    record.id,
                    record.quantity
                );
            }
            let last = last_seq.entry(record.item_id).or_default();
            if record.seq <= *last {
                bail!(
                    "history for item {}: non-monotonic sequence (last={}, found={})",
                    record.item_id,
                    last,
                    record.seq
                );
            }
            *last = record.seq;
        }

        Ok(())
    }
}

/// Exports and restores whole-system snapshots.
pub struct BackupService<S> {
    store: Arc<S>,
}

impl<S> Clone for BackupService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> BackupService<S>
where
    S: SnapshotStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn export(&self) -> Result<Snapshot, EngineError> {
        Ok(self.store.snapshot().await?)
    }

    /// Validate and restore. On a validation failure nothing changes.
    pub async fn restore(
        &self,
        snapshot: Snapshot,
        acting_user: &str,
    ) -> Result<(), EngineError> {
        snapshot
            .validate()
            .map_err(|e| DomainError::validation(format!("invalid backup: {e}")))?;
        self.store.replace_all(snapshot).await?;
        audit::record_best_effort(&*self.store, acting_user, "Restored system from backup.")
            .await;
        tracing::info!("system restored from backup");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::HistoryId;
    use stockroom_inventory::{MovementPayload, NewItem, Unit};

    fn item(code: &str) -> StockItem {
        StockItem::new(
            ItemId::new(),
            NewItem {
                code: code.to_string(),
                description: "thing".to_string(),
                category: "Misc".to_string(),
                equipment: String::new(),
                location: "A-01".to_string(),
                unit: Unit::Each,
                initial_stock: 1,
                min_stock: 0,
                unit_value_cents: 100,
                supplier_id: None,
            },
        )
        .unwrap()
    }

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            items: vec![],
            users: vec![],
            suppliers: vec![],
            history: vec![],
            audit: vec![],
        }
    }

    #[test]
    fn duplicate_codes_fail_validation() {
        let snapshot = Snapshot {
            items: vec![item("ABC-1"), item("abc-1")],
            ..empty_snapshot()
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn non_monotonic_history_fails_validation() {
        let id = ItemId::new();
        let record = |seq| HistoryRecord {
            id: HistoryId::new(),
            item_id: id,
            seq,
            recorded_at: Utc::now(),
            quantity: 1,
            user: "ana".to_string(),
            payload: MovementPayload::Entry {
                details: "x".to_string(),
            },
        };
        let snapshot = Snapshot {
            history: vec![record(1), record(1)],
            ..empty_snapshot()
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn snapshot_survives_a_json_round_trip() {
        let snapshot = Snapshot {
            items: vec![item("ABC-1")],
            ..empty_snapshot()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        back.validate().unwrap();
    }
}
