//! Expiry horizon scan over an inventory listing.

use chrono::NaiveDate;

use crate::models::InventoryItem;

/// An item whose expiry date falls within the warning horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringItem {
    pub item: InventoryItem,
    /// Days from `today` to the expiry date; negative for already-expired stock
    pub days_until_expiry: i64,
}

/// Collect items expiring within `horizon_days` of `today`, soonest first.
///
/// Items whose expiry date does not parse as `YYYY-MM-DD` are silently
/// skipped; already-expired items (negative days remaining) are kept.
pub fn expiring_within(
    listing: &[InventoryItem],
    horizon_days: i64,
    today: NaiveDate,
) -> Vec<ExpiringItem> {
    let mut expiring: Vec<ExpiringItem> = listing
        .iter()
        .filter_map(|item| {
            let expiry = NaiveDate::parse_from_str(&item.expiry_date, "%Y-%m-%d").ok()?;
            let days_until_expiry = (expiry - today).num_days();
            (days_until_expiry <= horizon_days).then(|| ExpiringItem {
                item: item.clone(),
                days_until_expiry,
            })
        })
        .collect();

    expiring.sort_by_key(|e| e.days_until_expiry);
    expiring
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(product: &str, expiry: &str) -> InventoryItem {
        InventoryItem {
            product: product.to_string(),
            quantity: 10,
            expiry_date: expiry.to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_already_expired_is_included_with_negative_days() {
        let listing = vec![item("古い在庫", "2024-01-01")];
        let result = expiring_within(&listing, 30, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].days_until_expiry, -9);
    }

    #[test]
    fn test_unparseable_expiry_is_excluded() {
        let listing = vec![item("不明", "N/A"), item("和暦", "2024年2月1日")];
        assert!(expiring_within(&listing, 30, today()).is_empty());
        assert!(expiring_within(&listing, 10_000, today()).is_empty());
    }

    #[test]
    fn test_horizon_boundary() {
        let listing = vec![
            item("ちょうど", "2024-02-09"), // 30 days out
            item("一日先", "2024-02-10"),   // 31 days out
        ];
        let result = expiring_within(&listing, 30, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.product, "ちょうど");
        assert_eq!(result[0].days_until_expiry, 30);
    }

    #[test]
    fn test_sorted_soonest_first() {
        let listing = vec![
            item("あと20日", "2024-01-30"),
            item("期限切れ", "2024-01-05"),
            item("あと5日", "2024-01-15"),
        ];
        let result = expiring_within(&listing, 30, today());
        let order: Vec<i64> = result.iter().map(|e| e.days_until_expiry).collect();
        assert_eq!(order, vec![-5, 5, 20]);
    }
}
