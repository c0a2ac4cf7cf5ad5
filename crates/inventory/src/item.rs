use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, SupplierId};

/// Measurement unit for a stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Each,
    Kilogram,
    Meter,
    Pair,
    Coil,
    Box,
    Pieces,
    Liter,
    Pack,
    Roll,
    Bag,
    Rod,
    Can,
    Reel,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Each => "each",
            Unit::Kilogram => "kilogram",
            Unit::Meter => "meter",
            Unit::Pair => "pair",
            Unit::Coil => "coil",
            Unit::Box => "box",
            Unit::Pieces => "pieces",
            Unit::Liter => "liter",
            Unit::Pack => "pack",
            Unit::Roll => "roll",
            Unit::Bag => "bag",
            Unit::Rod => "rod",
            Unit::Can => "can",
            Unit::Reel => "reel",
        }
    }
}

/// User-facing item code.
///
/// Codes are alphanumeric plus hyphens, non-empty, and unique across the
/// catalog when compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCode(String);

impl ItemCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("item code cannot be empty"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomainError::validation(format!(
                "item code '{trimmed}' may only contain letters, digits and hyphens"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for uniqueness comparison.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn matches(&self, other: &ItemCode) -> bool {
        self.normalized() == other.normalized()
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger transition produced by an absolute stock overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransition {
    pub from: i64,
    pub to: i64,
}

/// Input shape for catalog creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub code: String,
    pub description: String,
    pub category: String,
    pub equipment: String,
    pub location: String,
    pub unit: Unit,
    /// Seeds `system_stock` at creation time; unused afterwards.
    pub initial_stock: i64,
    pub min_stock: i64,
    pub unit_value_cents: i64,
    pub supplier_id: Option<SupplierId>,
}

/// Input shape for catalog updates. Never carries a stock level:
/// `system_stock` changes only through movements and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub code: String,
    pub description: String,
    pub category: String,
    pub equipment: String,
    pub location: String,
    pub unit: Unit,
    pub min_stock: i64,
    pub unit_value_cents: i64,
    pub supplier_id: Option<SupplierId>,
}

/// A catalogued stock item.
///
/// `system_stock` is private: it is mutated only through [`StockItem::receive`],
/// [`StockItem::issue`] and [`StockItem::set_stock`], which the store invokes
/// on behalf of the movement engine and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    id: ItemId,
    code: ItemCode,
    description: String,
    category: String,
    equipment: String,
    location: String,
    unit: Unit,
    system_stock: i64,
    min_stock: i64,
    unit_value_cents: i64,
    supplier_id: Option<SupplierId>,
}

impl StockItem {
    pub fn new(id: ItemId, input: NewItem) -> DomainResult<Self> {
        let code = ItemCode::new(input.code)?;
        if input.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if input.initial_stock < 0 {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }
        if input.min_stock < 0 {
            return Err(DomainError::validation("minimum stock cannot be negative"));
        }
        if input.unit_value_cents < 0 {
            return Err(DomainError::validation("unit value cannot be negative"));
        }
        Ok(Self {
            id,
            code,
            description: input.description,
            category: input.category,
            equipment: input.equipment,
            location: input.location,
            unit: input.unit,
            system_stock: input.initial_stock,
            min_stock: input.min_stock,
            unit_value_cents: input.unit_value_cents,
            supplier_id: input.supplier_id,
        })
    }

    pub fn code(&self) -> &ItemCode {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn equipment(&self) -> &str {
        &self.equipment
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn system_stock(&self) -> i64 {
        self.system_stock
    }

    pub fn min_stock(&self) -> i64 {
        self.min_stock
    }

    pub fn unit_value_cents(&self) -> i64 {
        self.unit_value_cents
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn is_below_min(&self) -> bool {
        self.system_stock <= self.min_stock
    }

    /// Total value held at the current stock level, in cents.
    pub fn stock_value_cents(&self) -> i64 {
        self.system_stock.saturating_mul(self.unit_value_cents)
    }

    /// Ledger: add `qty` units. Returns the new level.
    pub fn receive(&mut self, qty: i64) -> DomainResult<i64> {
        if qty <= 0 {
            return Err(DomainError::invalid_quantity(format!(
                "entry quantity must be positive, got {qty}"
            )));
        }
        self.system_stock += qty;
        Ok(self.system_stock)
    }

    /// Ledger: remove `qty` units only if the result stays non-negative.
    ///
    /// On rejection the stock level is unchanged.
    pub fn issue(&mut self, qty: i64) -> DomainResult<i64> {
        if qty <= 0 {
            return Err(DomainError::invalid_quantity(format!(
                "exit quantity must be positive, got {qty}"
            )));
        }
        if self.system_stock - qty < 0 {
            return Err(DomainError::insufficient_stock(self.system_stock, qty));
        }
        self.system_stock -= qty;
        Ok(self.system_stock)
    }

    /// Ledger: unconditional overwrite, used by reconciliation once a physical
    /// count has been confirmed. The count is authoritative.
    pub fn set_stock(&mut self, new_qty: i64) -> DomainResult<StockTransition> {
        if new_qty < 0 {
            return Err(DomainError::invalid_quantity(format!(
                "counted stock cannot be negative, got {new_qty}"
            )));
        }
        let transition = StockTransition {
            from: self.system_stock,
            to: new_qty,
        };
        self.system_stock = new_qty;
        Ok(transition)
    }

    /// Replace descriptive fields. `system_stock` is untouched.
    pub fn update_details(&mut self, update: ItemUpdate) -> DomainResult<()> {
        let code = ItemCode::new(update.code)?;
        if update.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if update.min_stock < 0 {
            return Err(DomainError::validation("minimum stock cannot be negative"));
        }
        if update.unit_value_cents < 0 {
            return Err(DomainError::validation("unit value cannot be negative"));
        }
        self.code = code;
        self.description = update.description;
        self.category = update.category;
        self.equipment = update.equipment;
        self.location = update.location;
        self.unit = update.unit;
        self.min_stock = update.min_stock;
        self.unit_value_cents = update.unit_value_cents;
        self.supplier_id = update.supplier_id;
        Ok(())
    }
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(initial: i64) -> NewItem {
        NewItem {
            code: "BRG-6204".to_string(),
            description: "Ball bearing 6204".to_string(),
            category: "Mechanical".to_string(),
            equipment: "Conveyor 3".to_string(),
            location: "A-01".to_string(),
            unit: Unit::Each,
            initial_stock: initial,
            min_stock: 10,
            unit_value_cents: 1250,
            supplier_id: None,
        }
    }

    #[test]
    fn creation_seeds_system_stock_from_initial() {
        let item = StockItem::new(ItemId::new(), new_item(42)).unwrap();
        assert_eq!(item.system_stock(), 42);
    }

    #[test]
    fn code_rejects_invalid_characters() {
        assert!(ItemCode::new("BRG 6204").is_err());
        assert!(ItemCode::new("").is_err());
        assert!(ItemCode::new("BRG_6204").is_err());
        assert!(ItemCode::new("BRG-6204").is_ok());
    }

    #[test]
    fn code_comparison_is_case_insensitive() {
        let a = ItemCode::new("brg-6204").unwrap();
        let b = ItemCode::new("BRG-6204").unwrap();
        assert!(a.matches(&b));
    }

    #[test]
    fn issue_rejects_when_stock_would_go_negative() {
        let mut item = StockItem::new(ItemId::new(), new_item(5)).unwrap();
        let err = item.issue(6).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                available: 5,
                requested: 6
            }
        );
        assert_eq!(item.system_stock(), 5);
    }

    #[test]
    fn receive_and_issue_move_the_level() {
        let mut item = StockItem::new(ItemId::new(), new_item(100)).unwrap();
        assert_eq!(item.receive(50).unwrap(), 150);
        assert_eq!(item.issue(30).unwrap(), 120);
    }

    #[test]
    fn nonpositive_quantities_are_rejected() {
        let mut item = StockItem::new(ItemId::new(), new_item(10)).unwrap();
        assert!(matches!(
            item.receive(0),
            Err(DomainError::InvalidQuantity(_))
        ));
        assert!(matches!(
            item.issue(-3),
            Err(DomainError::InvalidQuantity(_))
        ));
        assert_eq!(item.system_stock(), 10);
    }

    #[test]
    fn set_stock_reports_the_transition() {
        let mut item = StockItem::new(ItemId::new(), new_item(120)).unwrap();
        let t = item.set_stock(115).unwrap();
        assert_eq!(t, StockTransition { from: 120, to: 115 });
        assert_eq!(item.system_stock(), 115);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any sequence of movements keeps stock non-negative and
            /// equal to the initial level plus the signed deltas of the
            /// accepted operations.
            #[test]
            fn stock_tracks_accepted_deltas(
                initial in 0i64..10_000,
                ops in proptest::collection::vec((any::<bool>(), 1i64..500), 0..64)
            ) {
                let mut item = StockItem::new(ItemId::new(), new_item(initial)).unwrap();
                let mut expected = initial;
                for (is_entry, qty) in ops {
                    if is_entry {
                        prop_assert_eq!(item.receive(qty).unwrap(), expected + qty);
                        expected += qty;
                    } else {
                        match item.issue(qty) {
                            Ok(level) => {
                                expected -= qty;
                                prop_assert_eq!(level, expected);
                            }
                            Err(DomainError::InsufficientStock { available, requested }) => {
                                prop_assert_eq!(available, expected);
                                prop_assert_eq!(requested, qty);
                            }
                            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                        }
                    }
                    prop_assert!(item.system_stock() >= 0);
                    prop_assert_eq!(item.system_stock(), expected);
                }
            }
        }
    }

    #[test]
    fn update_never_touches_stock() {
        let mut item = StockItem::new(ItemId::new(), new_item(77)).unwrap();
        item.update_details(ItemUpdate {
            code: "BRG-6205".to_string(),
            description: "Ball bearing 6205".to_string(),
            category: "Mechanical".to_string(),
            equipment: "Conveyor 3".to_string(),
            location: "A-02".to_string(),
            unit: Unit::Each,
            min_stock: 5,
            unit_value_cents: 1400,
            supplier_id: None,
        })
        .unwrap();
        assert_eq!(item.system_stock(), 77);
        assert_eq!(item.code().as_str(), "BRG-6205");
    }
}
