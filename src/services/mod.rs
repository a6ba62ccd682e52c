// src/services/mod.rs

//! External collaborators: warehouse fetch, spreadsheet sink, notifications,
//! and OCR text extraction.

pub mod fetch;
pub mod notify;
pub mod ocr;
pub mod sheets;

pub use fetch::{FetchSource, HttpFetcher};
pub use notify::Notifier;
pub use ocr::{TesseractOcr, TextExtractor};
pub use sheets::{GoogleSheets, SheetSink};
