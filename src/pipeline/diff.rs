//! Diff calculation between two inventory listings.
//!
//! Compares the freshly scraped listing against the previous snapshot and
//! classifies every product into shipment, increase, new, or removed.
//!
//! Pure and deterministic: no I/O, the event timestamp comes in as an
//! argument. Callers that need a stable order should sort by product name;
//! only grouping and per-product classification are guaranteed.

use chrono::{DateTime, Utc};

use crate::models::{
    ChangeKind, ChangeSet, InventoryItem, NewProduct, QuantityChange, RemovedProduct,
    index_by_product,
};

/// Calculate the diff between the current and previous listings.
///
/// Product names are the join key: two items are the same product iff their
/// trimmed names are byte-identical. Expiry dates compare as literal strings,
/// so unparsed raw expiry text still participates in change detection.
pub fn diff_listings(
    current: &[InventoryItem],
    previous: &[InventoryItem],
    now: DateTime<Utc>,
) -> ChangeSet {
    let curr_map = index_by_product(current);
    let prev_map = index_by_product(previous);

    let mut changes = Vec::new();
    let mut new_products = Vec::new();
    let mut removed_products = Vec::new();

    for (product, curr_item) in &curr_map {
        match prev_map.get(product) {
            Some(prev_item) => {
                let quantity_diff =
                    i64::from(curr_item.quantity) - i64::from(prev_item.quantity);
                let expiry_changed = curr_item.expiry_date != prev_item.expiry_date;

                if quantity_diff == 0 && !expiry_changed {
                    continue;
                }

                // A decrease is a shipment; anything else, including an
                // unchanged quantity with a new expiry date, is an increase.
                let kind = if quantity_diff < 0 {
                    ChangeKind::Shipment
                } else {
                    ChangeKind::Increase
                };

                changes.push(QuantityChange {
                    kind,
                    product: (*product).to_string(),
                    previous_quantity: prev_item.quantity,
                    current_quantity: curr_item.quantity,
                    quantity_diff,
                    previous_expiry: prev_item.expiry_date.clone(),
                    current_expiry: curr_item.expiry_date.clone(),
                    expiry_changed,
                    timestamp: now,
                });
            }
            None => {
                new_products.push(NewProduct {
                    product: (*product).to_string(),
                    quantity: curr_item.quantity,
                    expiry_date: curr_item.expiry_date.clone(),
                    timestamp: now,
                });
            }
        }
    }

    // A product that vanished from the listing. An explicit zero-quantity row
    // is not the same state and stays in `changes`.
    for (product, prev_item) in &prev_map {
        if !curr_map.contains_key(product) {
            removed_products.push(RemovedProduct {
                product: (*product).to_string(),
                previous_quantity: prev_item.quantity,
                timestamp: now,
            });
        }
    }

    ChangeSet {
        changes,
        new_products,
        removed_products,
        timestamp: now,
    }
}
