// src/pipeline/cycle.rs

//! Monitoring cycle controller.
//!
//! One cycle is fetch → compare → persist → notify → expiry check. A failed
//! or empty fetch aborts the cycle before anything is compared or persisted,
//! so the stored `latest` snapshot always reflects the last successful fetch.

use std::time::Duration;

use chrono::{Local, Utc};

use crate::error::Result;
use crate::models::{ChangeSet, Config, InventoryItem};
use crate::pipeline::{diff_listings, expiring_within};
use crate::services::sheets::{CHANGE_HEADERS, INVENTORY_HEADERS};
use crate::services::{FetchSource, Notifier, SheetSink};
use crate::storage::SnapshotStore;

/// Snapshot key holding the comparison baseline.
const LATEST_KEY: &str = "latest";

/// Outcome of one monitoring cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Inventory rows fetched this cycle
    pub fetched: usize,
    pub shipment_count: usize,
    pub new_count: usize,
    pub removed_count: usize,
    /// Why the cycle aborted, when it did
    pub error: Option<String>,
}

/// Cycle behavior switches taken from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    pub check_expiry: bool,
    pub expiry_days: i64,
}

/// Drives monitoring cycles against one fetch source.
pub struct Monitor {
    config: Config,
    store: SnapshotStore,
    notifier: Notifier,
    sheets: Option<Box<dyn SheetSink>>,
    options: CycleOptions,
}

impl Monitor {
    pub fn new(
        config: Config,
        store: SnapshotStore,
        notifier: Notifier,
        sheets: Option<Box<dyn SheetSink>>,
        options: CycleOptions,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
            sheets,
            options,
        }
    }

    /// Run one full cycle. Errors are contained: they end up in the report
    /// and the log, never in a panic or a propagated failure.
    pub async fn run_once(&mut self, source: &dyn FetchSource) -> CycleReport {
        log::info!("Starting inventory check...");
        match self.cycle(source).await {
            Ok(report) => {
                log::info!("Inventory check complete");
                report
            }
            Err(e) => {
                log::error!("Inventory check failed: {e}");
                CycleReport {
                    error: Some(e.to_string()),
                    ..CycleReport::default()
                }
            }
        }
    }

    /// Run cycles on a fixed interval until interrupted. The first cycle
    /// fires immediately; a failing cycle never stops the schedule.
    pub async fn run_scheduled(&mut self, source: &dyn FetchSource, interval: Duration) {
        log::info!(
            "Starting scheduled monitoring (interval: {} minutes)",
            interval.as_secs() / 60
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_once(source).await;
                    if let Some(error) = &report.error {
                        log::warn!("Cycle failed, waiting for next tick: {error}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupt received; stopping monitor");
                    break;
                }
            }
        }
    }

    async fn cycle(&mut self, source: &dyn FetchSource) -> Result<CycleReport> {
        let current = self.fetch(source).await?;

        if current.is_empty() {
            // An empty listing means "could not determine inventory", not
            // "zero items in stock"; don't fabricate mass removals.
            log::warn!("Fetched an empty inventory listing; skipping this cycle");
            return Ok(CycleReport::default());
        }
        log::info!("Fetched {} inventory rows", current.len());

        let changes = diff_listings(&current, self.store.get(LATEST_KEY), Utc::now());
        let report = CycleReport {
            fetched: current.len(),
            shipment_count: changes.shipments().len(),
            new_count: changes.new_products.len(),
            removed_count: changes.removed_products.len(),
            error: None,
        };

        if report.shipment_count > 0 {
            log::info!("Detected {} shipment(s)", report.shipment_count);
            self.notifier
                .notify_shipments(&changes, Some(&current))
                .await;
            self.record_changes(&changes).await;
        }

        if report.new_count > 0 {
            log::info!("Detected {} new product(s)", report.new_count);
        }
        if report.removed_count > 0 {
            log::info!("Detected {} removed product(s)", report.removed_count);
        }

        // The fetch succeeded, so this listing becomes the new baseline even
        // if a downstream sink fails.
        if let Err(e) = self.store.save(LATEST_KEY, &current).await {
            log::error!("Failed to persist snapshot: {e}");
        }
        self.record_inventory(&current).await;

        if self.options.check_expiry {
            let expiring = expiring_within(
                &current,
                self.options.expiry_days,
                Local::now().date_naive(),
            );
            self.notifier
                .notify_expiring(&expiring, self.options.expiry_days)
                .await;
        }

        Ok(report)
    }

    async fn fetch(&self, source: &dyn FetchSource) -> Result<Vec<InventoryItem>> {
        let warehouse = &self.config.warehouse;

        if let Some(login_url) = &warehouse.login_url {
            match (&warehouse.username, &warehouse.password) {
                (Some(username), Some(password)) => {
                    source.login(login_url, username, password).await?;
                }
                _ => {
                    log::warn!("Login URL set but credentials missing; skipping login");
                }
            }
        }

        source.scrape(&warehouse.inventory_url).await
    }

    /// Append the change log to the changes sheet, best effort.
    async fn record_changes(&self, changes: &ChangeSet) {
        let Some(sheets) = &self.sheets else { return };
        let sheet = &self.config.sheets.changes_sheet;

        let result = async {
            sheets.ensure_header(sheet, &CHANGE_HEADERS).await?;
            sheets.append_rows(sheet, &changes.to_sheet_rows()).await
        }
        .await;

        if let Err(e) = result {
            log::error!("Failed to record changes to sheet {sheet}: {e}");
        }
    }

    /// Append the fetched listing to the inventory history sheet, best effort.
    async fn record_inventory(&self, listing: &[InventoryItem]) {
        let Some(sheets) = &self.sheets else { return };
        let sheet = &self.config.sheets.inventory_sheet;

        let result = async {
            sheets.ensure_header(sheet, &INVENTORY_HEADERS).await?;
            sheets
                .append_rows(sheet, &crate::models::to_sheet_rows(listing))
                .await
        }
        .await;

        if let Err(e) = result {
            log::error!("Failed to record inventory to sheet {sheet}: {e}");
        }
    }
}
