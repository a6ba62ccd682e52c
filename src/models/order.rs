//! Structured order data extracted from scanned order forms.

use serde::{Deserialize, Serialize};

/// One line item on an order form.
///
/// Every field is optional: `None` means "not detected", never zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_name: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub amount: Option<String>,
}

impl OrderItem {
    /// True when no field has been detected yet.
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
            && self.amount.is_none()
    }
}

/// Best-effort structured view of one scanned order document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRecord {
    /// Order date in `YYYY-MM-DD`, or empty when no date was found
    pub date: String,

    /// Customer name, or empty when none was found
    pub customer_name: String,

    /// Extracted line items (at most one with the current line-scan)
    pub items: Vec<OrderItem>,

    /// Source file name
    pub filename: String,

    /// When extraction ran, `YYYY-MM-DD HH:MM:SS`
    pub processed_at: String,

    /// First 500 characters of the raw text, kept for review
    pub raw_text_excerpt: String,
}

impl OrderRecord {
    /// Flatten into order-sheet rows: date, customer, product, quantity,
    /// unit price, amount, remark, processed-at, filename.
    ///
    /// One row per item; a record with no items still yields exactly one row
    /// with blank item columns.
    pub fn to_sheet_rows(&self) -> Vec<Vec<String>> {
        let blank = OrderItem::default();
        let items: Vec<&OrderItem> = if self.items.is_empty() {
            vec![&blank]
        } else {
            self.items.iter().collect()
        };

        items
            .iter()
            .map(|item| {
                vec![
                    self.date.clone(),
                    self.customer_name.clone(),
                    item.product_name.clone().unwrap_or_default(),
                    item.quantity.clone().unwrap_or_default(),
                    item.unit_price.clone().unwrap_or_default(),
                    item.amount.clone().unwrap_or_default(),
                    String::new(), // remark
                    self.processed_at.clone(),
                    self.filename.clone(),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(items: Vec<OrderItem>) -> OrderRecord {
        OrderRecord {
            date: "2024-03-05".to_string(),
            customer_name: "山田商店".to_string(),
            items,
            filename: "fax_001.pdf".to_string(),
            processed_at: "2024-03-05 09:30:00".to_string(),
            raw_text_excerpt: String::new(),
        }
    }

    #[test]
    fn test_no_items_yields_one_blank_row() {
        let rows = record(vec![]).to_sheet_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 9);
        assert_eq!(rows[0][0], "2024-03-05");
        assert_eq!(rows[0][2], "");
        assert_eq!(rows[0][5], "");
    }

    #[test]
    fn test_one_row_per_item_sharing_header_fields() {
        let items = vec![
            OrderItem {
                product_name: Some("りんごジュース".to_string()),
                quantity: Some("10".to_string()),
                ..OrderItem::default()
            },
            OrderItem {
                product_name: Some("みかんゼリー".to_string()),
                amount: Some("4800".to_string()),
                ..OrderItem::default()
            },
        ];
        let rows = record(items).to_sheet_rows();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row[0], "2024-03-05");
            assert_eq!(row[1], "山田商店");
            assert_eq!(row[7], "2024-03-05 09:30:00");
            assert_eq!(row[8], "fax_001.pdf");
        }
        assert_eq!(rows[0][3], "10");
        assert_eq!(rows[1][5], "4800");
    }

    #[test]
    fn test_item_is_empty() {
        assert!(OrderItem::default().is_empty());
        let item = OrderItem {
            quantity: Some("3".to_string()),
            ..OrderItem::default()
        };
        assert!(!item.is_empty());
    }
}
