//! Order date extraction.
//!
//! Ordered pattern list: 4-digit-year CJK/slash forms, the 2-digit-year
//! variant, then plain ISO dashes. The first pattern whose match forms a
//! valid calendar date wins; an invalid date (month 13 and the like) skips
//! to the next pattern rather than erroring.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Century guess for a two-digit year as written on order forms: `..=30`
/// reads as 20xx, anything later as 19xx. An explicit heuristic, not a
/// general era converter.
pub fn century_from_two_digit(year: u32) -> i32 {
    if year <= 30 {
        2000 + year as i32
    } else {
        1900 + year as i32
    }
}

struct DatePattern {
    regex: Regex,
    two_digit_year: bool,
}

fn patterns() -> &'static [DatePattern] {
    static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            DatePattern {
                regex: Regex::new(r"(\d{4})[年/](\d{1,2})[月/](\d{1,2})日?").expect("static regex"),
                two_digit_year: false,
            },
            DatePattern {
                regex: Regex::new(r"(\d{2})[年/](\d{1,2})[月/](\d{1,2})日?").expect("static regex"),
                two_digit_year: true,
            },
            DatePattern {
                regex: Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("static regex"),
                two_digit_year: false,
            },
        ]
    })
}

/// Extract the first date in the text as `YYYY-MM-DD`, or `None`.
pub fn extract_date(text: &str) -> Option<String> {
    for pattern in patterns() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };

        let (Ok(raw_year), Ok(month), Ok(day)) = (
            caps[1].parse::<u32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        ) else {
            continue;
        };

        let year = if pattern.two_digit_year {
            century_from_two_digit(raw_year)
        } else {
            raw_year as i32
        };

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_date() {
        assert_eq!(
            extract_date("注文日 2024年3月5日"),
            Some("2024-03-05".to_string())
        );
    }

    #[test]
    fn test_slash_date() {
        assert_eq!(extract_date("2024/12/31 注文"), Some("2024-12-31".to_string()));
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(extract_date("date: 2024-3-5"), Some("2024-03-05".to_string()));
    }

    #[test]
    fn test_two_digit_year_recent() {
        // 24 <= 30 reads as 2024
        assert_eq!(extract_date("24/3/5"), Some("2024-03-05".to_string()));
    }

    #[test]
    fn test_two_digit_year_old() {
        // 95 > 30 reads as 1995
        assert_eq!(extract_date("95年1月2日"), Some("1995-01-02".to_string()));
    }

    #[test]
    fn test_century_heuristic_boundaries() {
        assert_eq!(century_from_two_digit(0), 2000);
        assert_eq!(century_from_two_digit(30), 2030);
        assert_eq!(century_from_two_digit(31), 1931);
        assert_eq!(century_from_two_digit(99), 1999);
    }

    #[test]
    fn test_invalid_month_falls_through() {
        assert_eq!(extract_date("2024-13-01"), None);
    }

    #[test]
    fn test_invalid_first_pattern_tries_next() {
        // The slash form is invalid (month 13), the ISO form further on is not
        assert_eq!(
            extract_date("2024/13/01 の続き 2024-06-15"),
            Some("2024-06-15".to_string())
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_date("日付は書いてありません"), None);
    }
}
