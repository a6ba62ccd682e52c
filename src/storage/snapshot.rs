//! File-backed snapshot store for inventory listings.
//!
//! ## Document layout
//!
//! One UTF-8 JSON object mapping string keys to either a listing (array of
//! item objects) or an ISO timestamp string under the sibling key
//! `<key>_timestamp`:
//!
//! ```text
//! {
//!   "latest": [ { "product": "...", "quantity": 100, ... }, ... ],
//!   "latest_timestamp": "2024-03-05T09:30:00Z"
//! }
//! ```
//!
//! A missing file is an empty store; a corrupt file degrades to an empty
//! store with a logged error, and the next successful save re-establishes it.
//! Writes go to a temp file first and are renamed into place so a crash
//! mid-write never corrupts previously durable data.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::InventoryItem;

const EMPTY_LISTING: &[InventoryItem] = &[];

/// One value in the snapshot document: a listing or a timestamp string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Entry {
    Listing(Vec<InventoryItem>),
    Timestamp(String),
}

/// Durable keyed storage of inventory listings and their capture timestamps.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    entries: HashMap<String, Entry>,
}

impl SnapshotStore {
    /// Open a store backed by the given file, loading any existing history.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path).await;
        Self { path, entries }
    }

    async fn load(path: &PathBuf) -> HashMap<String, Entry> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No snapshot file at {}; starting empty", path.display());
                return HashMap::new();
            }
            Err(e) => {
                log::error!("Failed to read snapshot file {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!(
                    "Snapshot file {} is corrupt ({}); starting empty",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    /// Get the listing stored under `key`, or an empty listing.
    pub fn get(&self, key: &str) -> &[InventoryItem] {
        match self.entries.get(key) {
            Some(Entry::Listing(listing)) => listing,
            _ => EMPTY_LISTING,
        }
    }

    /// Get the capture timestamp recorded alongside `key`, if any.
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.entries.get(&format!("{key}_timestamp")) {
            Some(Entry::Timestamp(raw)) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Store `listing` under `key` with a capture timestamp, and persist.
    ///
    /// Overwrites any prior value for the key. The caller decides when a
    /// fetch was successful enough to become the new baseline.
    pub async fn save(&mut self, key: &str, listing: &[InventoryItem]) -> Result<()> {
        self.entries
            .insert(key.to_string(), Entry::Listing(listing.to_vec()));
        self.entries.insert(
            format!("{key}_timestamp"),
            Entry::Timestamp(Utc::now().to_rfc3339()),
        );
        self.persist().await
    }

    /// Write the whole document atomically (write to temp, then rename).
    async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(&self.entries)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(AppError::Io)?;
        log::debug!("Snapshot history saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(product: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            product: product.to_string(),
            quantity,
            expiry_date: "2024-12-31".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::open(tmp.path().join("history.json")).await;
        assert!(store.get("latest").is_empty());
        assert!(store.timestamp("latest").is_none());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");

        let mut store = SnapshotStore::open(&path).await;
        store
            .save("latest", &[item("りんごジュース", 100)])
            .await
            .unwrap();

        let reloaded = SnapshotStore::open(&path).await;
        let listing = reloaded.get("latest");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product, "りんごジュース");
        assert!(reloaded.timestamp("latest").is_some());
    }

    #[tokio::test]
    async fn test_save_overwrites_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");

        let mut store = SnapshotStore::open(&path).await;
        store.save("latest", &[item("米", 20)]).await.unwrap();
        store.save("latest", &[item("米", 12)]).await.unwrap();

        let reloaded = SnapshotStore::open(&path).await;
        assert_eq!(reloaded.get("latest")[0].quantity, 12);
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = SnapshotStore::open(&path).await;
        assert!(store.get("latest").is_empty());
    }

    #[tokio::test]
    async fn test_other_keys_survive_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");

        let mut store = SnapshotStore::open(&path).await;
        store.save("baseline", &[item("味噌", 5)]).await.unwrap();
        store.save("latest", &[item("米", 20)]).await.unwrap();

        let reloaded = SnapshotStore::open(&path).await;
        assert_eq!(reloaded.get("baseline").len(), 1);
        assert_eq!(reloaded.get("latest").len(), 1);
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");

        let mut store = SnapshotStore::open(&path).await;
        store.save("latest", &[item("米", 20)]).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
