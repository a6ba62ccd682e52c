//! Inventory monitor CLI
//!
//! Watches the consignment warehouse inventory page, detects shipments
//! against the stored snapshot, and notifies staff.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use stockwatch::{
    error::Result,
    models::Config,
    pipeline::{CycleOptions, Monitor},
    services::{GoogleSheets, HttpFetcher, Notifier, SheetSink},
    storage::SnapshotStore,
};

/// Consignment warehouse inventory monitor
#[derive(Parser, Debug)]
#[command(name = "monitor", version, about = "Warehouse inventory shipment monitor")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "stockwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run one cycle and exit
    #[arg(long)]
    once: bool,

    /// Minutes between cycles in scheduled mode
    #[arg(long, value_name = "MINUTES")]
    interval: Option<u64>,

    /// Skip the expiry horizon check
    #[arg(long)]
    no_expiry_check: bool,

    /// Day horizon for expiry warnings
    #[arg(long, value_name = "DAYS")]
    expiry_days: Option<i64>,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the inventory monitor.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("stockwatch inventory monitor starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate_for_monitor()?;

    let interval_minutes = cli.interval.unwrap_or(config.monitor.interval_minutes);
    let options = CycleOptions {
        check_expiry: !cli.no_expiry_check,
        expiry_days: cli.expiry_days.unwrap_or(config.monitor.expiry_days),
    };

    let fetcher = HttpFetcher::new(
        &config.http,
        config.warehouse.selectors.clone(),
        config.warehouse.login_form.clone(),
    )?;

    // Sheets is optional; a broken sheets config degrades to console-only.
    let sheets: Option<Box<dyn SheetSink>> = match GoogleSheets::from_config(&config.sheets) {
        Ok(Some(client)) => {
            log::info!("Google Sheets sink enabled");
            Some(Box::new(client))
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Google Sheets sink disabled: {e}");
            None
        }
    };

    let store = SnapshotStore::open(&config.monitor.snapshot_path).await;
    let notifier = Notifier::new(config.smtp.clone());

    let mut monitor = Monitor::new(config, store, notifier, sheets, options);

    if cli.once {
        let report = monitor.run_once(&fetcher).await;
        log::info!(
            "Cycle done: {} fetched, {} shipment(s), {} new, {} removed",
            report.fetched,
            report.shipment_count,
            report.new_count,
            report.removed_count
        );
    } else {
        let interval = Duration::from_secs(interval_minutes * 60);
        monitor.run_scheduled(&fetcher, interval).await;
    }

    log::info!("Done!");

    Ok(())
}
