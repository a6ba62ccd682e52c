// src/services/fetch.rs

//! Inventory fetch service.
//!
//! Fetches the warehouse inventory listing page and extracts item rows using
//! configured CSS selectors. Sites that require a session get a form-post
//! login over the same cookie-holding client.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, InventoryItem, LoginForm, ScrapeSelectors};

/// Capability to log into the warehouse site and scrape its listing.
///
/// The monitoring cycle is backend-agnostic; tests substitute a fixture
/// implementation, and a browser-driving backend would slot in here too.
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Authenticate against the login page. Fails loudly; the cycle treats a
    /// failed login as a failed fetch.
    async fn login(&self, url: &str, username: &str, password: &str) -> Result<()>;

    /// Fetch and parse the inventory listing.
    async fn scrape(&self, url: &str) -> Result<Vec<InventoryItem>>;
}

/// HTTP + CSS selector fetch backend.
pub struct HttpFetcher {
    client: Client,
    selectors: ScrapeSelectors,
    login_form: LoginForm,
}

impl HttpFetcher {
    /// Build a fetcher with a cookie-holding client so a login session
    /// carries over to the scrape request.
    pub fn new(
        http: &HttpConfig,
        selectors: ScrapeSelectors,
        login_form: LoginForm,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            selectors,
            login_form,
        })
    }
}

#[async_trait]
impl FetchSource for HttpFetcher {
    async fn login(&self, url: &str, username: &str, password: &str) -> Result<()> {
        // Prime the session cookie before posting the form.
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::fetch("login page", e))?;

        let form = [
            (self.login_form.username_field.as_str(), username),
            (self.login_form.password_field.as_str(), password),
        ];
        self.client
            .post(url)
            .form(&form)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::fetch("login post", e))?;

        log::info!("Logged in to warehouse site");
        Ok(())
    }

    async fn scrape(&self, url: &str) -> Result<Vec<InventoryItem>> {
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::fetch(url, e))?
            .text()
            .await?;

        let listing = parse_listing(&text, &self.selectors, Utc::now())?;
        log::info!("Scraped {} inventory rows from {}", listing.len(), url);
        Ok(listing)
    }
}

/// Extract inventory rows from a listing page.
///
/// Tries the table row selector first and falls back to the card/list item
/// selector when the table yields nothing. Rows missing a product element
/// are skipped with a warning.
pub fn parse_listing(
    html: &str,
    selectors: &ScrapeSelectors,
    scraped_at: DateTime<Utc>,
) -> Result<Vec<InventoryItem>> {
    let row_sel = parse_selector(&selectors.row)?;
    let item_sel = parse_selector(&selectors.item)?;
    let product_sel = parse_selector(&selectors.product)?;
    let quantity_sel = parse_selector(&selectors.quantity)?;
    let expiry_sel = parse_selector(&selectors.expiry)?;

    let document = Html::parse_document(html);

    let mut rows: Vec<ElementRef> = document.select(&row_sel).collect();
    if rows.is_empty() {
        log::debug!("No table rows matched; trying list item selector");
        rows = document.select(&item_sel).collect();
    }

    let mut listing = Vec::new();
    for row in rows {
        let Some(product) = select_text(&row, &product_sel) else {
            log::warn!("Inventory row without a product element; skipping");
            continue;
        };
        let quantity_text = select_text(&row, &quantity_sel).unwrap_or_default();
        let expiry_text = select_text(&row, &expiry_sel).unwrap_or_default();

        listing.push(InventoryItem {
            product,
            quantity: parse_quantity(&quantity_text),
            expiry_date: parse_expiry_date(&expiry_text),
            scraped_at,
        });
    }

    Ok(listing)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, e))
}

fn select_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    let element = row.select(selector).next()?;
    let text: String = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Pull the quantity out of free text like `100個`, `残り 1,200`, or `100`.
/// Returns 0 when no digits are present.
pub fn parse_quantity(text: &str) -> u32 {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("static regex"));

    let cleaned = text.replace(',', "");
    digits
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Normalize an expiry date to `YYYY-MM-DD` when a known pattern matches and
/// forms a valid calendar date; otherwise return the trimmed raw text.
pub fn parse_expiry_date(text: &str) -> String {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(\d{4})[/-](\d{1,2})[/-](\d{1,2})").expect("static regex"),
            Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").expect("static regex"),
        ]
    });

    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            let parsed = (
                caps[1].parse::<i32>(),
                caps[2].parse::<u32>(),
                caps[3].parse::<u32>(),
            );
            if let (Ok(year), Ok(month), Ok(day)) = parsed
                && let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
            {
                return date.format("%Y-%m-%d").to_string();
            }
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_variants() {
        assert_eq!(parse_quantity("100"), 100);
        assert_eq!(parse_quantity("100個"), 100);
        assert_eq!(parse_quantity("残り1,200"), 1200);
        assert_eq!(parse_quantity("在庫なし"), 0);
        assert_eq!(parse_quantity(""), 0);
    }

    #[test]
    fn test_parse_expiry_date_formats() {
        assert_eq!(parse_expiry_date("2024/12/31"), "2024-12-31");
        assert_eq!(parse_expiry_date("2024-12-31"), "2024-12-31");
        assert_eq!(parse_expiry_date("2024年12月31日"), "2024-12-31");
        assert_eq!(parse_expiry_date("2024/3/5"), "2024-03-05");
    }

    #[test]
    fn test_parse_expiry_date_keeps_raw_text() {
        assert_eq!(parse_expiry_date(" 賞味期限なし "), "賞味期限なし");
        // Invalid calendar date falls back to raw text
        assert_eq!(parse_expiry_date("2024/13/01"), "2024/13/01");
    }

    const TABLE_HTML: &str = r#"
        <table class="inventory"><tbody>
            <tr>
                <td class="product-name">りんごジュース</td>
                <td class="quantity">100個</td>
                <td class="expiry-date">2024/12/31</td>
            </tr>
            <tr>
                <td class="product-name">みかんゼリー</td>
                <td class="quantity">50</td>
                <td class="expiry-date">2024年6月30日</td>
            </tr>
        </tbody></table>
    "#;

    #[test]
    fn test_parse_listing_table() {
        let listing =
            parse_listing(TABLE_HTML, &ScrapeSelectors::default(), Utc::now()).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].product, "りんごジュース");
        assert_eq!(listing[0].quantity, 100);
        assert_eq!(listing[0].expiry_date, "2024-12-31");
        assert_eq!(listing[1].expiry_date, "2024-06-30");
    }

    #[test]
    fn test_parse_listing_falls_back_to_items() {
        let html = r#"
            <div class="inventory-item">
                <span class="product-name">米</span>
                <span class="quantity">20</span>
                <span class="expiry-date">2025-01-01</span>
            </div>
        "#;
        let listing = parse_listing(html, &ScrapeSelectors::default(), Utc::now()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product, "米");
    }

    #[test]
    fn test_parse_listing_skips_rows_without_product() {
        let html = r#"
            <table class="inventory"><tbody>
                <tr><td class="quantity">10</td></tr>
                <tr>
                    <td class="product-name">味噌</td>
                    <td class="quantity">5</td>
                    <td class="expiry-date">n/a</td>
                </tr>
            </tbody></table>
        "#;
        let listing = parse_listing(html, &ScrapeSelectors::default(), Utc::now()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product, "味噌");
        assert_eq!(listing[0].expiry_date, "n/a");
    }

    #[test]
    fn test_parse_listing_rejects_bad_selector() {
        let selectors = ScrapeSelectors {
            row: ":::".to_string(),
            ..ScrapeSelectors::default()
        };
        assert!(parse_listing("<html></html>", &selectors, Utc::now()).is_err());
    }
}
