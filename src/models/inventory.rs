//! Inventory item data structure.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inventory row scraped from the warehouse listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    /// Product name (the join key between listings)
    pub product: String,

    /// Quantity in stock
    pub quantity: u32,

    /// Expiry date, `YYYY-MM-DD` when parseable, else the raw scraped text
    pub expiry_date: String,

    /// When this row was scraped
    pub scraped_at: DateTime<Utc>,
}

/// Index a listing by trimmed product name.
///
/// Duplicate product names within one listing silently collapse; the last
/// occurrence wins.
pub fn index_by_product(listing: &[InventoryItem]) -> HashMap<&str, &InventoryItem> {
    listing
        .iter()
        .map(|item| (item.product.trim(), item))
        .collect()
}

/// Rows for the inventory history sheet: product, quantity, expiry, scraped-at.
pub fn to_sheet_rows(listing: &[InventoryItem]) -> Vec<Vec<String>> {
    listing
        .iter()
        .map(|item| {
            vec![
                item.product.clone(),
                item.quantity.to_string(),
                item.expiry_date.clone(),
                item.scraped_at.to_rfc3339(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            product: product.to_string(),
            quantity,
            expiry_date: "2024-12-31".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_index_trims_names() {
        let listing = vec![item(" りんごジュース ", 10)];
        let index = index_by_product(&listing);
        assert!(index.contains_key("りんごジュース"));
    }

    #[test]
    fn test_index_last_duplicate_wins() {
        let listing = vec![item("米", 10), item("米", 25)];
        let index = index_by_product(&listing);
        assert_eq!(index.len(), 1);
        assert_eq!(index["米"].quantity, 25);
    }

    #[test]
    fn test_sheet_rows_shape() {
        let rows = to_sheet_rows(&[item("味噌", 3)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[0][0], "味噌");
        assert_eq!(rows[0][1], "3");
    }
}
