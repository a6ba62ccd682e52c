//! Order processor CLI
//!
//! Digitizes scanned/faxed purchase orders: OCR text extraction, heuristic
//! field extraction, spreadsheet append, and moving processed files aside.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use stockwatch::{
    error::{AppError, Result},
    extract::extract_order,
    models::{Config, OrderRecord},
    services::sheets::ORDER_HEADERS,
    services::{GoogleSheets, SheetSink, TesseractOcr, TextExtractor, ocr},
};

/// Fax order form processor
#[derive(Parser, Debug)]
#[command(name = "orders", version, about = "Scanned order form digitizer")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "stockwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Process every file in the input directory (the default when no
    /// --file is given)
    #[arg(long)]
    batch: bool,

    /// Confirm each record interactively before the sheet write
    #[arg(long)]
    manual_review: bool,

    /// Process a single file instead of scanning the input directory
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Collect order files from the input directory.
async fn scan_input_dir(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(input_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && ocr::is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Print the extracted record and ask for confirmation.
fn confirm_record(record: &OrderRecord) -> Result<bool> {
    let bar = "=".repeat(50);
    println!("\n{bar}");
    println!("ファイル: {}", record.filename);
    println!(
        "日付: {}",
        if record.date.is_empty() { "N/A" } else { &record.date }
    );
    println!(
        "得意先: {}",
        if record.customer_name.is_empty() {
            "N/A"
        } else {
            &record.customer_name
        }
    );
    println!("商品数: {}", record.items.len());
    println!("\n抽出されたテキスト（最初の500文字）:");
    println!("{}", record.raw_text_excerpt);
    println!("{bar}");

    print!("\nこのデータをスプレッドシートに追加しますか？ (y/n): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Process one order file end to end. Returns false when the file should
/// stay in place for retry.
async fn process_file(
    path: &Path,
    extractor: &TesseractOcr,
    sheets: &dyn SheetSink,
    orders_sheet: &str,
    manual_review: bool,
) -> Result<bool> {
    log::info!("Processing {}", path.display());

    let text = extractor.extract_text(path).await?;
    if text.trim().is_empty() {
        log::warn!("No text extracted from {}", path.display());
        return Ok(false);
    }

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let record = extract_order(&text, filename);

    if manual_review && !confirm_record(&record)? {
        log::info!("Skipped by reviewer: {}", path.display());
        return Ok(false);
    }

    sheets.append_rows(orders_sheet, &record.to_sheet_rows()).await?;

    log::info!("Finished {}", path.display());
    Ok(true)
}

/// Main entry point for the order processor.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("stockwatch order processor starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate_for_orders()?;

    let input_dir = PathBuf::from(&config.orders.input_dir);
    let processed_dir = PathBuf::from(&config.orders.processed_dir);
    tokio::fs::create_dir_all(&input_dir).await?;
    tokio::fs::create_dir_all(&processed_dir).await?;

    let extractor = TesseractOcr::new(&config.orders);

    // Orders need the sheet sink; validation already required the id.
    let sheets = GoogleSheets::from_config(&config.sheets)?
        .ok_or_else(|| AppError::config("sheets.spreadsheet_id is not set"))?;
    let orders_sheet = config.sheets.orders_sheet.clone();
    sheets.ensure_header(&orders_sheet, &ORDER_HEADERS).await?;

    let files = match &cli.file {
        Some(file) => {
            if !file.exists() {
                return Err(AppError::config(format!(
                    "File not found: {}",
                    file.display()
                )));
            }
            vec![file.clone()]
        }
        None => {
            let files = scan_input_dir(&input_dir).await?;
            if files.is_empty() {
                log::info!("No files to process in {}", input_dir.display());
                return Ok(());
            }
            files
        }
    };

    log::info!("Processing {} file(s)", files.len());

    let mut success_count = 0;
    for path in &files {
        match process_file(
            path,
            &extractor,
            &sheets,
            &orders_sheet,
            cli.manual_review,
        )
        .await
        {
            Ok(true) => {
                success_count += 1;

                // Move out of the input directory; a failed move is not a
                // processing failure.
                if let Some(name) = path.file_name() {
                    let target = processed_dir.join(name);
                    match tokio::fs::rename(path, &target).await {
                        Ok(()) => log::info!("Moved to processed: {}", target.display()),
                        Err(e) => log::warn!("Failed to move {}: {}", path.display(), e),
                    }
                }
            }
            Ok(false) => {}
            Err(e) => {
                // The file stays in place for retry
                log::error!("Processing failed for {}: {}", path.display(), e);
            }
        }
    }

    log::info!("Done: {}/{} file(s) succeeded", success_count, files.len());

    Ok(())
}
