//! Application configuration structures.
//!
//! Configuration is read once at startup and handed to each component; no
//! module reads process environment on its own.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Warehouse site access and scrape selectors
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Monitoring cycle settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Google Sheets sink (optional)
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// SMTP notification settings (optional)
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Order form processing settings
    #[serde(default)]
    pub orders: OrdersConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate settings the inventory monitor cannot run without.
    pub fn validate_for_monitor(&self) -> Result<()> {
        if self.warehouse.inventory_url.trim().is_empty() {
            return Err(AppError::config(
                "warehouse.inventory_url is not set; check the config file",
            ));
        }
        Url::parse(&self.warehouse.inventory_url)?;
        if let Some(login_url) = &self.warehouse.login_url {
            Url::parse(login_url)?;
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.monitor.interval_minutes == 0 {
            return Err(AppError::validation("monitor.interval_minutes must be > 0"));
        }
        Ok(())
    }

    /// Validate settings the order processor cannot run without.
    pub fn validate_for_orders(&self) -> Result<()> {
        if self.sheets.spreadsheet_id.is_none() {
            return Err(AppError::config(
                "sheets.spreadsheet_id is not set; check the config file",
            ));
        }
        if self.orders.input_dir.trim().is_empty() {
            return Err(AppError::validation("orders.input_dir is empty"));
        }
        if self.orders.processed_dir.trim().is_empty() {
            return Err(AppError::validation("orders.processed_dir is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Warehouse site access settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Inventory listing page URL (required for monitoring)
    #[serde(default)]
    pub inventory_url: String,

    /// Login page URL, when the site requires a session
    #[serde(default)]
    pub login_url: Option<String>,

    /// Login username
    #[serde(default)]
    pub username: Option<String>,

    /// Login password
    #[serde(default)]
    pub password: Option<String>,

    /// CSS selectors for the inventory listing
    #[serde(default)]
    pub selectors: ScrapeSelectors,

    /// Form field names for the login post
    #[serde(default)]
    pub login_form: LoginForm,
}

/// CSS selectors for pulling inventory rows out of the listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSelectors {
    /// Selector for table rows
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Fallback selector for card/list style listings
    #[serde(default = "defaults::item_selector")]
    pub item: String,

    /// Product name element within a row
    #[serde(default = "defaults::product_selector")]
    pub product: String,

    /// Quantity element within a row
    #[serde(default = "defaults::quantity_selector")]
    pub quantity: String,

    /// Expiry date element within a row
    #[serde(default = "defaults::expiry_selector")]
    pub expiry: String,
}

impl Default for ScrapeSelectors {
    fn default() -> Self {
        Self {
            row: defaults::row_selector(),
            item: defaults::item_selector(),
            product: defaults::product_selector(),
            quantity: defaults::quantity_selector(),
            expiry: defaults::expiry_selector(),
        }
    }
}

/// Form field names used when posting login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default = "defaults::username_field")]
    pub username_field: String,

    #[serde(default = "defaults::password_field")]
    pub password_field: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username_field: defaults::username_field(),
            password_field: defaults::password_field(),
        }
    }
}

/// Monitoring cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Path of the snapshot history document
    #[serde(default = "defaults::snapshot_path")]
    pub snapshot_path: String,

    /// Minutes between cycles in scheduled mode
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,

    /// Day horizon for expiry warnings
    #[serde(default = "defaults::expiry_days")]
    pub expiry_days: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            snapshot_path: defaults::snapshot_path(),
            interval_minutes: defaults::interval_minutes(),
            expiry_days: defaults::expiry_days(),
        }
    }
}

/// Google Sheets sink settings. Absent spreadsheet id disables the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet document id
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// OAuth bearer token for the Sheets API
    #[serde(default)]
    pub api_token: Option<String>,

    /// Sheet receiving inventory snapshots
    #[serde(default = "defaults::inventory_sheet")]
    pub inventory_sheet: String,

    /// Sheet receiving the change log
    #[serde(default = "defaults::changes_sheet")]
    pub changes_sheet: String,

    /// Sheet receiving extracted order rows
    #[serde(default = "defaults::orders_sheet")]
    pub orders_sheet: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_token: None,
            inventory_sheet: defaults::inventory_sheet(),
            changes_sheet: defaults::changes_sheet(),
            orders_sheet: defaults::orders_sheet(),
        }
    }
}

/// SMTP notification settings. Absent recipient disables email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "defaults::smtp_server")]
    pub server: String,

    #[serde(default = "defaults::smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Recipient address for notifications
    #[serde(default)]
    pub notification_email: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: defaults::smtp_server(),
            port: defaults::smtp_port(),
            username: None,
            password: None,
            notification_email: None,
        }
    }
}

/// Order form processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Directory scanned for incoming order files
    #[serde(default = "defaults::input_dir")]
    pub input_dir: String,

    /// Directory successfully processed files are moved into
    #[serde(default = "defaults::processed_dir")]
    pub processed_dir: String,

    /// Tesseract executable; `tesseract` on PATH when unset
    #[serde(default)]
    pub tesseract_cmd: Option<String>,

    /// OCR language set
    #[serde(default = "defaults::ocr_lang")]
    pub ocr_lang: String,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            input_dir: defaults::input_dir(),
            processed_dir: defaults::processed_dir(),
            tesseract_cmd: None,
            ocr_lang: defaults::ocr_lang(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; stockwatch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Scrape selector defaults
    pub fn row_selector() -> String {
        "table.inventory tbody tr".into()
    }
    pub fn item_selector() -> String {
        ".inventory-item".into()
    }
    pub fn product_selector() -> String {
        ".product-name".into()
    }
    pub fn quantity_selector() -> String {
        ".quantity".into()
    }
    pub fn expiry_selector() -> String {
        ".expiry-date".into()
    }

    // Login form defaults
    pub fn username_field() -> String {
        "username".into()
    }
    pub fn password_field() -> String {
        "password".into()
    }

    // Monitor defaults
    pub fn snapshot_path() -> String {
        "inventory_history.json".into()
    }
    pub fn interval_minutes() -> u64 {
        60
    }
    pub fn expiry_days() -> i64 {
        30
    }

    // Sheet name defaults
    pub fn inventory_sheet() -> String {
        "InventoryHistory".into()
    }
    pub fn changes_sheet() -> String {
        "InventoryChanges".into()
    }
    pub fn orders_sheet() -> String {
        "Sheet1".into()
    }

    // SMTP defaults
    pub fn smtp_server() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        587
    }

    // Orders defaults
    pub fn input_dir() -> String {
        "./input".into()
    }
    pub fn processed_dir() -> String {
        "./processed".into()
    }
    pub fn ocr_lang() -> String {
        "jpn+eng".into()
    }
}
