//! Divergence computation for inventory reconciliation.
//!
//! Pure math over a submitted count batch and the current catalog; applying
//! the resulting adjustments is infrastructure's job.

use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;

use crate::item::StockItem;
use crate::movement::{AdjustmentBatch, ItemCount};

/// One item whose physical count diverges from system stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceLine {
    pub item_id: ItemId,
    pub code: String,
    pub description: String,
    pub system_stock: i64,
    pub counted: i64,
    /// counted − system_stock.
    pub delta: i64,
    /// delta × unit value; negative when the count came up short.
    pub value_impact_cents: i64,
}

/// The "to adjust" set plus its monetary impact, reported before committing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub lines: Vec<DivergenceLine>,
    pub total_impact_cents: i64,
}

impl DivergenceReport {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The adjustment batch that would resolve every divergence.
    pub fn to_adjust(&self) -> AdjustmentBatch {
        AdjustmentBatch::new(
            self.lines
                .iter()
                .map(|line| ItemCount {
                    item_id: line.item_id,
                    counted: line.counted,
                })
                .collect(),
        )
    }
}

/// Compare submitted counts against system stock.
///
/// Items with no submitted count, counts matching system stock, and counts
/// referencing unknown items are all excluded; only real divergences remain.
pub fn compute_divergence(batch: &AdjustmentBatch, items: &[StockItem]) -> DivergenceReport {
    use stockroom_core::Entity;

    let mut lines = Vec::new();
    let mut total = 0i64;
    for count in &batch.counts {
        let Some(item) = items.iter().find(|i| *i.id() == count.item_id) else {
            continue;
        };
        let delta = count.counted - item.system_stock();
        if delta == 0 {
            continue;
        }
        let impact = delta.saturating_mul(item.unit_value_cents());
        total += impact;
        lines.push(DivergenceLine {
            item_id: count.item_id,
            code: item.code().as_str().to_string(),
            description: item.description().to_string(),
            system_stock: item.system_stock(),
            counted: count.counted,
            delta,
            value_impact_cents: impact,
        });
    }
    DivergenceReport {
        lines,
        total_impact_cents: total,
    }
}
