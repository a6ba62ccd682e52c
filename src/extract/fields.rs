//! Customer name and line item heuristics.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::OrderItem;

fn customer_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"得意先[：:\s]*([^\n]+)",
            r"お客様[：:\s]*([^\n]+)",
            r"宛先[：:\s]*([^\n]+)",
            r"御中[：:\s]*([^\n]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static regex"))
        .collect()
    })
}

fn numeric_only() -> &'static Regex {
    static NUMERIC_ONLY: OnceLock<Regex> = OnceLock::new();
    NUMERIC_ONLY.get_or_init(|| Regex::new(r"^[\d\s,]+$").expect("static regex"))
}

/// Extract the customer name.
///
/// Labeled markers first (得意先/お客様/宛先/御中), stripping honorific
/// characters from the capture; otherwise fall back to the first line among
/// the top five that looks like a name: 3–49 characters, not numeric-only.
pub fn extract_customer(text: &str) -> Option<String> {
    static HONORIFICS: OnceLock<Regex> = OnceLock::new();
    let honorifics = HONORIFICS.get_or_init(|| Regex::new(r"[様御中]").expect("static regex"));

    for pattern in customer_patterns() {
        if let Some(caps) = pattern.captures(text) {
            let name = honorifics.replace_all(caps[1].trim(), "");
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }

    for line in text.lines().take(5) {
        let line = line.trim();
        let length = line.chars().count();
        if length > 2 && length < 50 && !numeric_only().is_match(line) {
            return Some(line.to_string());
        }
    }

    None
}

/// Extract line items with a single-pass line scan.
///
/// One accumulating record: labeled quantity/unit-price overwrite on every
/// match, the first bare number-like token claims the amount, and the first
/// non-numeric line longer than two characters claims the product name. At
/// most one item per document comes out of this scan.
pub fn extract_items(text: &str) -> Vec<OrderItem> {
    static QUANTITY: OnceLock<Regex> = OnceLock::new();
    static UNIT_PRICE: OnceLock<Regex> = OnceLock::new();
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    static NUMERIC_LINE: OnceLock<Regex> = OnceLock::new();

    let quantity = QUANTITY.get_or_init(|| Regex::new(r"数量[：:\s]*([\d,]+)").expect("static regex"));
    let unit_price =
        UNIT_PRICE.get_or_init(|| Regex::new(r"単価[：:\s]*([\d,]+)").expect("static regex"));
    let amount = AMOUNT.get_or_init(|| Regex::new(r"[\d,]+円?").expect("static regex"));
    let numeric_line =
        NUMERIC_LINE.get_or_init(|| Regex::new(r"^[\d\s,円]+$").expect("static regex"));

    let mut item = OrderItem::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = quantity.captures(line) {
            item.quantity = Some(caps[1].replace(',', ""));
        }

        if let Some(caps) = unit_price.captures(line) {
            item.unit_price = Some(caps[1].replace(',', ""));
        }

        if item.amount.is_none()
            && let Some(m) = amount.find(line)
        {
            item.amount = Some(m.as_str().replace(',', "").replace('円', ""));
        }

        if item.product_name.is_none()
            && !numeric_line.is_match(line)
            && line.chars().count() > 2
        {
            item.product_name = Some(line.to_string());
        }
    }

    if item.is_empty() { vec![] } else { vec![item] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_customer() {
        assert_eq!(
            extract_customer("得意先: 山田商店様"),
            Some("山田商店".to_string())
        );
        assert_eq!(
            extract_customer("宛先：田中青果 御中"),
            Some("田中青果".to_string())
        );
    }

    #[test]
    fn test_customer_fallback_to_first_lines() {
        let text = "12,345\n株式会社ヤマダフーズ\n数量: 10";
        assert_eq!(
            extract_customer(text),
            Some("株式会社ヤマダフーズ".to_string())
        );
    }

    #[test]
    fn test_customer_fallback_skips_numeric_lines() {
        assert_eq!(extract_customer("123\n4,567\n89"), None);
    }

    #[test]
    fn test_customer_fallback_respects_length_bounds() {
        // Two characters is too short for the fallback
        assert_eq!(extract_customer("あい"), None);
        let long_line = "あ".repeat(50);
        assert_eq!(extract_customer(&long_line), None);
    }

    #[test]
    fn test_items_labeled_fields() {
        let text = "りんごジュース 24本入\n数量: 1,000\n単価: 120";
        let items = extract_items(text);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.product_name.as_deref(), Some("りんごジュース 24本入"));
        assert_eq!(item.quantity.as_deref(), Some("1000"));
        assert_eq!(item.unit_price.as_deref(), Some("120"));
    }

    #[test]
    fn test_amount_claimed_once() {
        let text = "金額 12,000円\nもう一つ 500円";
        let items = extract_items(text);
        assert_eq!(items[0].amount.as_deref(), Some("12000"));
    }

    #[test]
    fn test_product_claimed_once() {
        let text = "りんごジュース\nみかんゼリー";
        let items = extract_items(text);
        assert_eq!(items[0].product_name.as_deref(), Some("りんごジュース"));
    }

    #[test]
    fn test_single_item_per_document() {
        let text = "商品A\n数量: 10\n\n商品B\n数量: 20";
        let items = extract_items(text);
        // The line scan keeps one accumulating record; later quantities
        // overwrite, later products don't.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name.as_deref(), Some("商品A"));
        assert_eq!(items[0].quantity.as_deref(), Some("20"));
    }

    #[test]
    fn test_empty_text_yields_no_items() {
        assert!(extract_items("").is_empty());
        assert!(extract_items("\n  \n").is_empty());
    }
}
