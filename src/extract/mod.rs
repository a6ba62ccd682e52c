// src/extract/mod.rs

//! Order form field extraction.
//!
//! Turns OCR text into a structured [`OrderRecord`] with regex heuristics.
//! Best effort by design: a miss is an empty field, never an error.

mod date;
mod fields;

use chrono::Local;

use crate::models::OrderRecord;

pub use date::{century_from_two_digit, extract_date};
pub use fields::{extract_customer, extract_items};

/// Length of the raw text excerpt kept on the record for review.
const EXCERPT_CHARS: usize = 500;

/// Extract a structured order record from raw document text.
pub fn extract_order(text: &str, filename: &str) -> OrderRecord {
    log::info!("Extracting order data from {filename}");

    let date = extract_date(text).unwrap_or_default();
    let customer_name = extract_customer(text).unwrap_or_default();
    let items = extract_items(text);

    log::info!(
        "Extraction done: date={:?}, customer={:?}, items={}",
        date,
        customer_name,
        items.len()
    );

    OrderRecord {
        date,
        customer_name,
        items,
        filename: filename.to_string(),
        processed_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        raw_text_excerpt: text.chars().take(EXCERPT_CHARS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
注文書
得意先: 山田商店様
2024年3月5日

りんごジュース 24本入
数量: 10
単価: 120
金額 1,200円
";

    #[test]
    fn test_extract_order_full_document() {
        let record = extract_order(SAMPLE, "fax_001.pdf");
        assert_eq!(record.date, "2024-03-05");
        assert_eq!(record.customer_name, "山田商店");
        assert_eq!(record.filename, "fax_001.pdf");
        assert_eq!(record.items.len(), 1);
        assert_eq!(
            record.items[0].product_name.as_deref(),
            Some("りんごジュース 24本入")
        );
    }

    #[test]
    fn test_extract_order_never_fails_on_garbage() {
        let record = extract_order("", "empty.png");
        assert_eq!(record.date, "");
        assert_eq!(record.customer_name, "");
        assert!(record.items.is_empty());

        let record = extract_order("\u{0}\u{1}###", "noise.png");
        assert_eq!(record.date, "");
    }

    #[test]
    fn test_extraction_is_idempotent_except_processed_at() {
        let a = extract_order(SAMPLE, "fax_001.pdf");
        let b = extract_order(SAMPLE, "fax_001.pdf");
        assert_eq!(a.date, b.date);
        assert_eq!(a.customer_name, b.customer_name);
        assert_eq!(a.items, b.items);
        assert_eq!(a.raw_text_excerpt, b.raw_text_excerpt);
    }

    #[test]
    fn test_excerpt_is_char_bounded() {
        let text = "あ".repeat(800);
        let record = extract_order(&text, "big.pdf");
        assert_eq!(record.raw_text_excerpt.chars().count(), 500);
    }
}
