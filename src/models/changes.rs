//! Change events produced by comparing two inventory listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a quantity change for a product present in both listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Quantity decreased; the primary signal this system exists to surface.
    Shipment,
    /// Quantity did not decrease. This also covers an unchanged quantity with
    /// a changed expiry date (a new lot arriving), so "increase" really means
    /// "non-decrease".
    Increase,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Shipment => "shipment",
            ChangeKind::Increase => "increase",
        }
    }
}

/// A quantity or expiry change for a product present in both listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub product: String,
    pub previous_quantity: u32,
    pub current_quantity: u32,
    /// current − previous; never zero unless the expiry changed
    pub quantity_diff: i64,
    pub previous_expiry: String,
    pub current_expiry: String,
    pub expiry_changed: bool,
    pub timestamp: DateTime<Utc>,
}

impl QuantityChange {
    /// Units shipped out. Zero for non-decreases.
    pub fn shipped_quantity(&self) -> u64 {
        if self.quantity_diff < 0 {
            self.quantity_diff.unsigned_abs()
        } else {
            0
        }
    }
}

/// A product present in the current listing but absent from the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProduct {
    pub product: String,
    pub quantity: u32,
    pub expiry_date: String,
    pub timestamp: DateTime<Utc>,
}

/// A product that disappeared from the listing entirely.
///
/// Absence of the row is the only "went to zero" signal; an explicit
/// zero-quantity row for a still-listed product is a different state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovedProduct {
    pub product: String,
    pub previous_quantity: u32,
    pub timestamp: DateTime<Utc>,
}

/// Everything one diff run detected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Shipments and increases for products present in both listings
    pub changes: Vec<QuantityChange>,
    pub new_products: Vec<NewProduct>,
    pub removed_products: Vec<RemovedProduct>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChangeSet {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
            || !self.new_products.is_empty()
            || !self.removed_products.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.changes.len() + self.new_products.len() + self.removed_products.len()
    }

    /// Only the detected shipments.
    pub fn shipments(&self) -> Vec<&QuantityChange> {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Shipment)
            .collect()
    }

    /// Rows for the change-log sheet: timestamp, product, type, previous
    /// quantity, current quantity, diff, previous expiry, current expiry,
    /// shipped quantity.
    pub fn to_sheet_rows(&self) -> Vec<Vec<String>> {
        self.changes
            .iter()
            .map(|change| {
                let shipped = match change.kind {
                    ChangeKind::Shipment => change.shipped_quantity().to_string(),
                    ChangeKind::Increase => String::new(),
                };
                vec![
                    change.timestamp.to_rfc3339(),
                    change.product.clone(),
                    change.kind.as_str().to_string(),
                    change.previous_quantity.to_string(),
                    change.current_quantity.to_string(),
                    change.quantity_diff.to_string(),
                    change.previous_expiry.clone(),
                    change.current_expiry.clone(),
                    shipped,
                ]
            })
            .collect()
    }
}
