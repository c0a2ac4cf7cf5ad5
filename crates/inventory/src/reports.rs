//! Operational report computations.
//!
//! Pure functions over the catalog and history; formatting, CSV export and
//! printing belong to the presentation layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::Entity;

use crate::history::{HistoryRecord, MovementPayload};
use crate::item::StockItem;

/// Items at or below their reorder threshold.
pub fn low_stock(items: &[StockItem]) -> Vec<StockItem> {
    items.iter().filter(|i| i.is_below_min()).cloned().collect()
}

/// One history record joined with its item, for the movement-by-period view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRow {
    pub recorded_at: DateTime<Utc>,
    /// "N/A" when the item has been deleted since the movement.
    pub code: String,
    pub description: String,
    pub kind: String,
    pub quantity: i64,
    pub user: String,
    pub detail: String,
}

/// All history joined with item code/description, filtered by an optional
/// date window, newest-first. History of deleted items is kept and rendered
/// as unresolvable.
pub fn movement_by_period(
    history: &[HistoryRecord],
    items: &[StockItem],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<MovementRow> {
    let mut rows: Vec<(DateTime<Utc>, u64, MovementRow)> = history
        .iter()
        .filter(|h| start.is_none_or(|s| h.recorded_at >= s))
        .filter(|h| end.is_none_or(|e| h.recorded_at <= e))
        .map(|h| {
            let item = items.iter().find(|i| *i.id() == h.item_id);
            let (code, description) = match item {
                Some(i) => (i.code().as_str().to_string(), i.description().to_string()),
                None => ("N/A".to_string(), "unknown item".to_string()),
            };
            let detail = match &h.payload {
                MovementPayload::Entry { details } => details.clone(),
                MovementPayload::Exit {
                    requester,
                    responsible,
                } => format!("Requester: {requester} / Responsible: {responsible}"),
                MovementPayload::Adjustment { previous, counted } => {
                    format!("From {previous} to {counted}")
                }
            };
            (
                h.recorded_at,
                h.seq,
                MovementRow {
                    recorded_at: h.recorded_at,
                    code,
                    description,
                    kind: h.kind().to_string(),
                    quantity: h.quantity,
                    user: h.user.clone(),
                    detail,
                },
            )
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    rows.into_iter().map(|(_, _, row)| row).collect()
}

/// Stock value consolidated per storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationValueRow {
    pub location: String,
    pub item_count: usize,
    pub total_value_cents: i64,
}

/// Per-location item count and held value, descending by value. Items with a
/// blank location group under "unassigned".
pub fn value_by_location(items: &[StockItem]) -> Vec<LocationValueRow> {
    let mut by_location: HashMap<String, (usize, i64)> = HashMap::new();
    for item in items {
        let location = if item.location().trim().is_empty() {
            "unassigned".to_string()
        } else {
            item.location().to_string()
        };
        let slot = by_location.entry(location).or_default();
        slot.0 += 1;
        slot.1 += item.stock_value_cents();
    }
    let mut rows: Vec<LocationValueRow> = by_location
        .into_iter()
        .map(|(location, (item_count, total_value_cents))| LocationValueRow {
            location,
            item_count,
            total_value_cents,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_value_cents
            .cmp(&a.total_value_cents)
            .then_with(|| a.location.cmp(&b.location))
    });
    rows
}

/// One item's share of consumption, by exit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopConsumedRow {
    pub description: String,
    pub value_cents: i64,
}

/// One category's slice of the total held value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub item_count: usize,
    pub value_cents: i64,
    /// Share of total held value, 0.0–100.0.
    pub share_pct: f64,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Units received in the window (entries only).
    pub total_entries: i64,
    /// Units issued in the window (exits only).
    pub total_exits: i64,
    pub top_consumed: Vec<TopConsumedRow>,
    pub category_distribution: Vec<CategoryShare>,
    pub below_min_count: usize,
    pub total_value_cents: i64,
}

const TOP_CONSUMED_LIMIT: usize = 7;

/// Compute the dashboard over an optional date window.
///
/// Adjustment records are not movements and never count towards entry/exit
/// totals or consumption. History of deleted items is skipped here (it has
/// no value to attribute), unlike the movement-by-period report.
pub fn dashboard_summary(
    items: &[StockItem],
    history: &[HistoryRecord],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> DashboardSummary {
    let mut total_entries = 0i64;
    let mut total_exits = 0i64;
    let mut consumption: HashMap<String, i64> = HashMap::new();

    for record in history {
        if start.is_some_and(|s| record.recorded_at < s)
            || end.is_some_and(|e| record.recorded_at > e)
        {
            continue;
        }
        let Some(item) = items.iter().find(|i| *i.id() == record.item_id) else {
            continue;
        };
        match &record.payload {
            MovementPayload::Entry { .. } => total_entries += record.quantity,
            MovementPayload::Exit { .. } => {
                total_exits += record.quantity;
                *consumption
                    .entry(item.description().to_string())
                    .or_default() += record.quantity.saturating_mul(item.unit_value_cents());
            }
            MovementPayload::Adjustment { .. } => {}
        }
    }

    let mut top_consumed: Vec<TopConsumedRow> = consumption
        .into_iter()
        .map(|(description, value_cents)| TopConsumedRow {
            description,
            value_cents,
        })
        .collect();
    top_consumed.sort_by(|a, b| {
        b.value_cents
            .cmp(&a.value_cents)
            .then_with(|| a.description.cmp(&b.description))
    });
    top_consumed.truncate(TOP_CONSUMED_LIMIT);

    let total_value_cents: i64 = items.iter().map(StockItem::stock_value_cents).sum();
    let mut by_category: HashMap<String, (usize, i64)> = HashMap::new();
    for item in items {
        let slot = by_category.entry(item.category().to_string()).or_default();
        slot.0 += 1;
        slot.1 += item.stock_value_cents();
    }
    let mut category_distribution: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, (item_count, value_cents))| CategoryShare {
            category,
            item_count,
            value_cents,
            share_pct: if total_value_cents == 0 {
                0.0
            } else {
                value_cents as f64 / total_value_cents as f64 * 100.0
            },
        })
        .collect();
    category_distribution.sort_by(|a, b| {
        b.value_cents
            .cmp(&a.value_cents)
            .then_with(|| a.category.cmp(&b.category))
    });

    DashboardSummary {
        total_entries,
        total_exits,
        top_consumed,
        category_distribution,
        below_min_count: items.iter().filter(|i| i.is_below_min()).count(),
        total_value_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::UncommittedMovement;
    use crate::item::{NewItem, Unit};
    use chrono::Duration;
    use stockroom_core::{HistoryId, ItemId};

    fn item(code: &str, location: &str, category: &str, stock: i64, min: i64, value: i64) -> StockItem {
        StockItem::new(
            ItemId::new(),
            NewItem {
                code: code.to_string(),
                description: format!("{code} description"),
                category: category.to_string(),
                equipment: String::new(),
                location: location.to_string(),
                unit: Unit::Each,
                initial_stock: stock,
                min_stock: min,
                unit_value_cents: value,
                supplier_id: None,
            },
        )
        .unwrap()
    }

    fn stored(m: UncommittedMovement, seq: u64) -> HistoryRecord {
        HistoryRecord {
            id: HistoryId::new(),
            item_id: m.item_id,
            seq,
            recorded_at: m.recorded_at,
            quantity: m.quantity,
            user: m.user,
            payload: m.payload,
        }
    }

    #[test]
    fn low_stock_uses_inclusive_threshold() {
        let items = vec![
            item("A-1", "L1", "EPI", 10, 10, 100),
            item("A-2", "L1", "EPI", 11, 10, 100),
        ];
        let low = low_stock(&items);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].code().as_str(), "A-1");
    }

    #[test]
    fn movement_report_resolves_deleted_items_as_unknown() {
        let it = item("A-1", "L1", "EPI", 10, 0, 100);
        let now = Utc::now();
        let history = vec![
            stored(
                UncommittedMovement::entry(*it.id(), 5, "ana", now, "Supplier: X. Invoice: N/A. Notes: N/A."),
                1,
            ),
            stored(
                UncommittedMovement::exit(ItemId::new(), 2, "ana", now + Duration::seconds(1), "Maint", "Carlos"),
                1,
            ),
        ];
        let rows = movement_by_period(&history, std::slice::from_ref(&it), None, None);
        assert_eq!(rows.len(), 2);
        // newest first
        assert_eq!(rows[0].code, "N/A");
        assert_eq!(rows[0].description, "unknown item");
        assert_eq!(rows[1].code, "A-1");
    }

    #[test]
    fn movement_report_respects_the_window() {
        let it = item("A-1", "L1", "EPI", 10, 0, 100);
        let now = Utc::now();
        let history = vec![
            stored(UncommittedMovement::entry(*it.id(), 5, "ana", now - Duration::days(10), "old"), 1),
            stored(UncommittedMovement::entry(*it.id(), 7, "ana", now, "recent"), 2),
        ];
        let rows = movement_by_period(
            &history,
            std::slice::from_ref(&it),
            Some(now - Duration::days(1)),
            None,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 7);
    }

    #[test]
    fn value_by_location_groups_blank_as_unassigned() {
        let items = vec![
            item("A-1", "Shelf-1", "EPI", 10, 0, 100),   // 1000
            item("A-2", "", "EPI", 5, 0, 100),           // 500
            item("A-3", "Shelf-1", "EPI", 1, 0, 5000),   // 5000
        ];
        let rows = value_by_location(&items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "Shelf-1");
        assert_eq!(rows[0].item_count, 2);
        assert_eq!(rows[0].total_value_cents, 6000);
        assert_eq!(rows[1].location, "unassigned");
    }

    #[test]
    fn dashboard_ignores_adjustments_and_ranks_consumption() {
        let a = item("A-1", "L1", "EPI", 100, 0, 100);
        let b = item("B-1", "L1", "Tools", 100, 0, 1000);
        let now = Utc::now();
        let history = vec![
            stored(UncommittedMovement::entry(*a.id(), 40, "ana", now, "x"), 1),
            stored(UncommittedMovement::exit(*a.id(), 10, "ana", now, "Maint", "Carlos"), 2),
            stored(UncommittedMovement::exit(*b.id(), 3, "ana", now, "Maint", "Carlos"), 1),
            stored(UncommittedMovement::adjustment(*a.id(), "ana", now, 100, 90), 3),
        ];
        let summary = dashboard_summary(&[a.clone(), b.clone()], &history, None, None);
        assert_eq!(summary.total_entries, 40);
        assert_eq!(summary.total_exits, 13);
        // b consumed 3 × 1000 = 3000 > a consumed 10 × 100 = 1000
        assert_eq!(summary.top_consumed[0].description, b.description());
        assert_eq!(summary.top_consumed[0].value_cents, 3000);
        assert_eq!(summary.total_value_cents, 100 * 100 + 100 * 1000);
    }
}
