//! Movement request shapes, validated at the boundary.
//!
//! Presentation code submits these intents; the engine validates them before
//! any state is touched. Forms never mutate stock directly.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, HistoryId, ItemId};

use crate::item::ItemCode;

fn or_na(value: &Option<String>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim(),
        _ => "N/A",
    }
}

/// Intent: register a stock entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub item_id: ItemId,
    pub quantity: i64,
    pub supplier: Option<String>,
    pub invoice_ref: Option<String>,
    pub observations: Option<String>,
}

impl EntryRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::invalid_quantity(format!(
                "entry quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }

    /// Free-text details stored on the Entry history record. Absent fields
    /// default to "N/A".
    pub fn details(&self) -> String {
        format!(
            "Supplier: {}. Invoice: {}. Notes: {}.",
            or_na(&self.supplier),
            or_na(&self.invoice_ref),
            or_na(&self.observations)
        )
    }

    /// Invoice reference as referenced by the audit trail.
    pub fn invoice_label(&self) -> &str {
        or_na(&self.invoice_ref)
    }
}

/// Intent: register a stock exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub item_id: ItemId,
    pub quantity: i64,
    /// Department or person requesting the material.
    pub requester: String,
    /// Person who authorized or fulfilled the exit.
    pub responsible: String,
}

impl ExitRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::invalid_quantity(format!(
                "exit quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// One physical count submitted for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub item_id: ItemId,
    pub counted: i64,
}

/// A batch of physical counts. Items without a submitted count are simply
/// absent from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjustmentBatch {
    pub counts: Vec<ItemCount>,
}

impl AdjustmentBatch {
    pub fn new(counts: Vec<ItemCount>) -> Self {
        Self { counts }
    }

    pub fn validate(&self) -> DomainResult<()> {
        for count in &self.counts {
            if count.counted < 0 {
                return Err(DomainError::invalid_quantity(format!(
                    "counted stock cannot be negative, got {} for item {}",
                    count.counted, count.item_id
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Outcome of an applied movement: the new level plus the paired history id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementReceipt {
    pub item_id: ItemId,
    pub code: ItemCode,
    pub history_id: HistoryId,
    pub quantity: i64,
    pub stock_level: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_details_default_absent_fields_to_na() {
        let req = EntryRequest {
            item_id: ItemId::new(),
            quantity: 50,
            supplier: Some("Aço Forte".to_string()),
            invoice_ref: Some("NF-123".to_string()),
            observations: None,
        };
        assert_eq!(
            req.details(),
            "Supplier: Aço Forte. Invoice: NF-123. Notes: N/A."
        );
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let req = EntryRequest {
            item_id: ItemId::new(),
            quantity: 1,
            supplier: Some("  ".to_string()),
            invoice_ref: None,
            observations: Some("urgent".to_string()),
        };
        assert_eq!(req.details(), "Supplier: N/A. Invoice: N/A. Notes: urgent.");
    }

    #[test]
    fn requests_reject_nonpositive_quantities() {
        let entry = EntryRequest {
            item_id: ItemId::new(),
            quantity: 0,
            supplier: None,
            invoice_ref: None,
            observations: None,
        };
        assert!(matches!(
            entry.validate(),
            Err(DomainError::InvalidQuantity(_))
        ));

        let exit = ExitRequest {
            item_id: ItemId::new(),
            quantity: -1,
            requester: "Maintenance".to_string(),
            responsible: "Carlos".to_string(),
        };
        assert!(matches!(
            exit.validate(),
            Err(DomainError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn batch_rejects_negative_counts() {
        let batch = AdjustmentBatch::new(vec![ItemCount {
            item_id: ItemId::new(),
            counted: -2,
        }]);
        assert!(matches!(
            batch.validate(),
            Err(DomainError::InvalidQuantity(_))
        ));
    }
}
