// src/services/sheets.rs

//! Spreadsheet sink.
//!
//! Append-only tabular writer with enforced header rows. The production
//! implementation talks to the Google Sheets values API over plain HTTP;
//! OAuth token acquisition is outside this tool, a bearer token comes from
//! configuration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::SheetsConfig;

/// Column headers for the extracted-orders sheet.
pub const ORDER_HEADERS: [&str; 9] = [
    "日付",
    "得意先名",
    "品名",
    "数量",
    "単価",
    "金額",
    "備考",
    "処理日時",
    "元ファイル名",
];

/// Column headers for the inventory history sheet.
pub const INVENTORY_HEADERS: [&str; 4] = ["商品名", "数量", "賞味期限", "取得日時"];

/// Column headers for the change-log sheet.
pub const CHANGE_HEADERS: [&str; 9] = [
    "日時",
    "商品名",
    "変更タイプ",
    "前回数量",
    "現在数量",
    "数量差分",
    "前回賞味期限",
    "現在賞味期限",
    "出荷数量",
];

/// Append-only sheet writer.
#[async_trait]
pub trait SheetSink: Send + Sync {
    /// Write the header row if it is missing or differs from `headers`.
    async fn ensure_header(&self, sheet: &str, headers: &[&str]) -> Result<()>;

    /// Append data rows below the existing content.
    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets values-API client.
pub struct GoogleSheets {
    client: Client,
    spreadsheet_id: String,
    api_token: String,
}

impl GoogleSheets {
    const BASE: &'static str = "https://sheets.googleapis.com/v4/spreadsheets";

    /// Build a client from config. Returns `None` when no spreadsheet id is
    /// configured (the sink is optional).
    pub fn from_config(config: &SheetsConfig) -> Result<Option<Self>> {
        let Some(spreadsheet_id) = config.spreadsheet_id.clone() else {
            return Ok(None);
        };
        let api_token = config.api_token.clone().ok_or_else(|| {
            AppError::config("sheets.spreadsheet_id is set but sheets.api_token is missing")
        })?;

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Some(Self {
            client,
            spreadsheet_id,
            api_token,
        }))
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            Self::BASE,
            self.spreadsheet_id,
            range,
            suffix
        )
    }

    async fn get_header_row(&self, sheet: &str) -> Result<Vec<String>> {
        let url = self.values_url(&format!("{sheet}!1:1"), "");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::sheets(format!(
                "header read for {sheet} failed: {}",
                response.status()
            )));
        }

        let range: ValueRange = response.json().await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn write_header_row(&self, sheet: &str, headers: &[&str]) -> Result<()> {
        let url = self.values_url(&format!("{sheet}!1:1"), "");
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [headers] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::sheets(format!(
                "header write for {sheet} failed: {}",
                response.status()
            )));
        }
        log::info!("Header row created on sheet {sheet}");
        Ok(())
    }
}

#[async_trait]
impl SheetSink for GoogleSheets {
    async fn ensure_header(&self, sheet: &str, headers: &[&str]) -> Result<()> {
        let existing = self.get_header_row(sheet).await?;
        if existing != headers {
            self.write_header_row(sheet, headers).await?;
        }
        Ok(())
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let url = self.values_url(&format!("{sheet}!A:Z"), ":append");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::sheets(format!(
                "append to {sheet} failed: {}",
                response.status()
            )));
        }

        log::info!("Appended {} rows to sheet {}", rows.len(), sheet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SheetsConfig;

    #[test]
    fn test_from_config_disabled_without_id() {
        let config = SheetsConfig::default();
        assert!(GoogleSheets::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_requires_token() {
        let config = SheetsConfig {
            spreadsheet_id: Some("abc".to_string()),
            ..SheetsConfig::default()
        };
        assert!(GoogleSheets::from_config(&config).is_err());
    }

    #[test]
    fn test_values_url_shape() {
        let config = SheetsConfig {
            spreadsheet_id: Some("abc123".to_string()),
            api_token: Some("token".to_string()),
            ..SheetsConfig::default()
        };
        let sheets = GoogleSheets::from_config(&config).unwrap().unwrap();
        assert_eq!(
            sheets.values_url("Sheet1!A:Z", ":append"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1!A:Z:append"
        );
    }

    #[test]
    fn test_header_constants_match_row_widths() {
        assert_eq!(ORDER_HEADERS.len(), 9);
        assert_eq!(INVENTORY_HEADERS.len(), 4);
        assert_eq!(CHANGE_HEADERS.len(), 9);
    }
}
