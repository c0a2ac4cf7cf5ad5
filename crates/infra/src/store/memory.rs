use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{AuditEntryId, Entity, HistoryId, ItemId, SupplierId, UserId};
use stockroom_inventory::{
    HistoryRecord, ItemCode, StockItem, StockTransition, UncommittedMovement,
};
use stockroom_parties::{Supplier, User};

use crate::audit::AuditLogEntry;
use crate::backup::Snapshot;

use super::{
    AuditStore, DirectoryStore, HistoryStore, ItemStore, SnapshotStore, StockLedger, StoreError,
};

fn poisoned() -> StoreError {
    StoreError::Transport("lock poisoned".to_string())
}

/// In-memory store satisfying every persistence trait.
///
/// Intended for tests/dev. Each ledger primitive runs inside a single
/// write-lock critical section, which makes the conditional decrement atomic
/// with its sufficiency check.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<ItemId, StockItem>>,
    history: RwLock<HashMap<ItemId, Vec<HistoryRecord>>>,
    audit: RwLock<Vec<AuditLogEntry>>,
    users: RwLock<HashMap<UserId, User>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(stream: &[HistoryRecord]) -> u64 {
        stream.last().map(|r| r.seq).unwrap_or(0) + 1
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn insert_item(&self, item: StockItem) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(*item.id(), item);
        Ok(())
    }

    async fn item(&self, id: ItemId) -> Result<Option<StockItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(&id).cloned())
    }

    async fn item_by_code(&self, code: &ItemCode) -> Result<Option<StockItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.values().find(|i| i.code().matches(code)).cloned())
    }

    async fn items(&self) -> Result<Vec<StockItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        let mut all: Vec<StockItem> = items.values().cloned().collect();
        all.sort_by(|a, b| a.code().normalized().cmp(&b.code().normalized()));
        Ok(all)
    }

    async fn update_item(&self, item: StockItem) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let slot = items.get_mut(item.id()).ok_or(StoreError::NotFound)?;
        *slot = item;
        Ok(())
    }

    async fn remove_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl StockLedger for InMemoryStore {
    async fn increment(&self, id: ItemId, qty: i64) -> Result<i64, StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let item = items.get_mut(&id).ok_or(StoreError::NotFound)?;
        item.receive(qty)
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))
    }

    async fn decrement(&self, id: ItemId, qty: i64) -> Result<i64, StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let item = items.get_mut(&id).ok_or(StoreError::NotFound)?;
        match item.issue(qty) {
            Ok(level) => Ok(level),
            Err(stockroom_core::DomainError::InsufficientStock {
                available,
                requested,
            }) => Err(StoreError::InsufficientStock {
                available,
                requested,
            }),
            Err(other) => Err(StoreError::InvalidRequest(other.to_string())),
        }
    }

    async fn set_absolute(
        &self,
        id: ItemId,
        new_qty: i64,
    ) -> Result<StockTransition, StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let item = items.get_mut(&id).ok_or(StoreError::NotFound)?;
        item.set_stock(new_qty)
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn append_history(
        &self,
        movement: UncommittedMovement,
    ) -> Result<HistoryRecord, StoreError> {
        movement
            .validate()
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let mut history = self.history.write().map_err(|_| poisoned())?;
        let stream = history.entry(movement.item_id).or_default();
        let record = HistoryRecord {
            id: HistoryId::new(),
            item_id: movement.item_id,
            seq: Self::next_seq(stream),
            recorded_at: movement.recorded_at,
            quantity: movement.quantity,
            user: movement.user,
            payload: movement.payload,
        };
        stream.push(record.clone());
        Ok(record)
    }

    async fn history_for(&self, item_id: ItemId) -> Result<Vec<HistoryRecord>, StoreError> {
        let history = self.history.read().map_err(|_| poisoned())?;
        let mut records = history.get(&item_id).cloned().unwrap_or_default();
        records.reverse(); // append order -> newest-first
        Ok(records)
    }

    async fn all_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        let history = self.history.read().map_err(|_| poisoned())?;
        Ok(history.values().flatten().cloned().collect())
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn append_audit(&self, user: &str, action: &str) -> Result<AuditLogEntry, StoreError> {
        let mut audit = self.audit.write().map_err(|_| poisoned())?;
        let entry = AuditLogEntry {
            id: AuditEntryId::new(),
            timestamp: Utc::now(),
            user: user.to_string(),
            action: action.to_string(),
        };
        audit.push(entry.clone());
        Ok(entry)
    }

    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        let audit = self.audit.read().map_err(|_| poisoned())?;
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(*user.id(), user);
        Ok(())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn user_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users
            .values()
            .find(|u| u.normalized_email() == normalized_email)
            .cloned())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn update_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let slot = users.get_mut(user.id()).ok_or(StoreError::NotFound)?;
        *slot = user;
        Ok(())
    }

    async fn remove_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| poisoned())?;
        suppliers.insert(*supplier.id(), supplier);
        Ok(())
    }

    async fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        let suppliers = self.suppliers.read().map_err(|_| poisoned())?;
        Ok(suppliers.get(&id).cloned())
    }

    async fn suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let suppliers = self.suppliers.read().map_err(|_| poisoned())?;
        let mut all: Vec<Supplier> = suppliers.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn update_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| poisoned())?;
        let slot = suppliers
            .get_mut(supplier.id())
            .ok_or(StoreError::NotFound)?;
        *slot = supplier;
        Ok(())
    }

    async fn remove_supplier(&self, id: SupplierId) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| poisoned())?;
        suppliers.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        let history = self.history.read().map_err(|_| poisoned())?;
        let audit = self.audit.read().map_err(|_| poisoned())?;
        let users = self.users.read().map_err(|_| poisoned())?;
        let suppliers = self.suppliers.read().map_err(|_| poisoned())?;
        Ok(Snapshot {
            items: items.values().cloned().collect(),
            users: users.values().cloned().collect(),
            suppliers: suppliers.values().cloned().collect(),
            history: history.values().flatten().cloned().collect(),
            audit: audit.clone(),
        })
    }

    async fn replace_all(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        // Take every lock before mutating anything so the swap is all-or-nothing.
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let mut history = self.history.write().map_err(|_| poisoned())?;
        let mut audit = self.audit.write().map_err(|_| poisoned())?;
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let mut suppliers = self.suppliers.write().map_err(|_| poisoned())?;

        *items = snapshot
            .items
            .into_iter()
            .map(|i| (*i.id(), i))
            .collect();
        let mut grouped: HashMap<ItemId, Vec<HistoryRecord>> = HashMap::new();
        for record in snapshot.history {
            grouped.entry(record.item_id).or_default().push(record);
        }
        for stream in grouped.values_mut() {
            stream.sort_by_key(|r| r.seq);
        }
        *history = grouped;
        *audit = snapshot.audit;
        *users = snapshot
            .users
            .into_iter()
            .map(|u| (*u.id(), u))
            .collect();
        *suppliers = snapshot
            .suppliers
            .into_iter()
            .map(|s| (*s.id(), s))
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::{NewItem, Unit};

    fn seeded_item(stock: i64) -> StockItem {
        StockItem::new(
            ItemId::new(),
            NewItem {
                code: "GLV-01".to_string(),
                description: "Nitrile gloves".to_string(),
                category: "EPI".to_string(),
                equipment: String::new(),
                location: "A-03".to_string(),
                unit: Unit::Pair,
                initial_stock: stock,
                min_stock: 0,
                unit_value_cents: 350,
                supplier_id: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn decrement_is_conditional() {
        let store = InMemoryStore::new();
        let item = seeded_item(10);
        let id = *item.id();
        store.insert_item(item).await.unwrap();

        assert_eq!(store.decrement(id, 4).await.unwrap(), 6);
        let err = store.decrement(id, 7).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                available: 6,
                requested: 7
            }
        ));
        assert_eq!(store.item(id).await.unwrap().unwrap().system_stock(), 6);
    }

    #[tokio::test]
    async fn history_sequences_are_per_item_and_monotonic() {
        let store = InMemoryStore::new();
        let a = ItemId::new();
        let b = ItemId::new();
        for (item, qty) in [(a, 1), (a, 2), (b, 3)] {
            let m = UncommittedMovement::entry(item, qty, "ana", Utc::now(), "x");
            store.append_history(m).await.unwrap();
        }
        let for_a = store.history_for(a).await.unwrap();
        assert_eq!(for_a.len(), 2);
        // newest-first
        assert_eq!(for_a[0].seq, 2);
        assert_eq!(for_a[1].seq, 1);
        assert_eq!(store.history_for(b).await.unwrap()[0].seq, 1);
    }

    #[tokio::test]
    async fn code_lookup_ignores_case() {
        let store = InMemoryStore::new();
        store.insert_item(seeded_item(1)).await.unwrap();
        let probe = ItemCode::new("glv-01").unwrap();
        assert!(store.item_by_code(&probe).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn audit_reads_newest_first() {
        let store = InMemoryStore::new();
        store.append_audit("ana", "first").await.unwrap();
        store.append_audit("ana", "second").await.unwrap();
        let recent = store.recent_audit(10).await.unwrap();
        assert_eq!(recent[0].action, "second");
        assert_eq!(recent[1].action, "first");
    }
}
