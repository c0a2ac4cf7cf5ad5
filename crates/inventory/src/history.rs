use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, HistoryId, ItemId};

/// Variant payload of a history record.
///
/// Entry and Exit document real movements; Adjustment is the informational
/// trace of a reconciliation overwrite and must never be counted as a
/// movement by downstream reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MovementPayload {
    Entry {
        /// Free text: supplier, invoice reference, observations.
        details: String,
    },
    Exit {
        /// Department or person that requested the material.
        requester: String,
        /// Person who authorized or fulfilled the exit.
        responsible: String,
    },
    Adjustment {
        previous: i64,
        counted: i64,
    },
}

/// A movement ready to be appended, before the store assigns id + sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedMovement {
    pub item_id: ItemId,
    /// Magnitude only; the sign is implied by the payload variant.
    pub quantity: i64,
    pub user: String,
    pub recorded_at: DateTime<Utc>,
    pub payload: MovementPayload,
}

impl UncommittedMovement {
    pub fn entry(
        item_id: ItemId,
        quantity: i64,
        user: impl Into<String>,
        recorded_at: DateTime<Utc>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            quantity,
            user: user.into(),
            recorded_at,
            payload: MovementPayload::Entry {
                details: details.into(),
            },
        }
    }

    pub fn exit(
        item_id: ItemId,
        quantity: i64,
        user: impl Into<String>,
        recorded_at: DateTime<Utc>,
        requester: impl Into<String>,
        responsible: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            quantity,
            user: user.into(),
            recorded_at,
            payload: MovementPayload::Exit {
                requester: requester.into(),
                responsible: responsible.into(),
            },
        }
    }

    pub fn adjustment(
        item_id: ItemId,
        user: impl Into<String>,
        recorded_at: DateTime<Utc>,
        previous: i64,
        counted: i64,
    ) -> Self {
        Self {
            item_id,
            quantity: (counted - previous).abs(),
            user: user.into(),
            recorded_at,
            payload: MovementPayload::Adjustment { previous, counted },
        }
    }

    /// Append precondition: a valid target and a positive magnitude.
    ///
    /// Zero-magnitude adjustments never reach the recorder because
    /// reconciliation excludes zero-divergence items.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::invalid_quantity(format!(
                "history quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// An immutable, stored history record (assigned id + per-item sequence).
///
/// Records are append-only: no update or delete exists anywhere in the
/// system, and they survive deletion of the item they reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub item_id: ItemId,
    /// Monotonically increasing position within the item's history.
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub quantity: i64,
    pub user: String,
    #[serde(flatten)]
    pub payload: MovementPayload,
}

impl HistoryRecord {
    /// Stable record kind tag.
    pub fn kind(&self) -> &'static str {
        match self.payload {
            MovementPayload::Entry { .. } => "entry",
            MovementPayload::Exit { .. } => "exit",
            MovementPayload::Adjustment { .. } => "adjustment",
        }
    }

    /// Whether this record documents a real movement (entry or exit), as
    /// opposed to a reconciliation adjustment.
    pub fn is_movement(&self) -> bool {
        !matches!(self.payload, MovementPayload::Adjustment { .. })
    }

    /// Signed ledger delta this record documents.
    pub fn signed_delta(&self) -> i64 {
        match self.payload {
            MovementPayload::Entry { .. } => self.quantity,
            MovementPayload::Exit { .. } => -self.quantity,
            MovementPayload::Adjustment { previous, counted } => counted - previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(payload: MovementPayload, quantity: i64) -> HistoryRecord {
        HistoryRecord {
            id: HistoryId::new(),
            item_id: ItemId::new(),
            seq: 1,
            recorded_at: Utc::now(),
            quantity,
            user: "carlos".to_string(),
            payload,
        }
    }

    #[test]
    fn signed_delta_follows_the_variant() {
        let entry = record(
            MovementPayload::Entry {
                details: "Supplier: N/A. Invoice: N/A. Notes: N/A.".to_string(),
            },
            30,
        );
        assert_eq!(entry.signed_delta(), 30);

        let exit = record(
            MovementPayload::Exit {
                requester: "Maintenance".to_string(),
                responsible: "Carlos".to_string(),
            },
            30,
        );
        assert_eq!(exit.signed_delta(), -30);

        let adj = record(
            MovementPayload::Adjustment {
                previous: 120,
                counted: 115,
            },
            5,
        );
        assert_eq!(adj.signed_delta(), -5);
        assert!(!adj.is_movement());
    }

    #[test]
    fn adjustment_magnitude_is_absolute_divergence() {
        let m = UncommittedMovement::adjustment(ItemId::new(), "ana", Utc::now(), 120, 115);
        assert_eq!(m.quantity, 5);
        m.validate().unwrap();
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let m = UncommittedMovement::entry(ItemId::new(), 0, "ana", Utc::now(), "x");
        assert!(matches!(
            m.validate(),
            Err(DomainError::InvalidQuantity(_))
        ));
    }
}
