// src/services/ocr.rs

//! Text extraction from scanned order files.
//!
//! Images go through the Tesseract CLI; PDFs with a text layer go through
//! pdf-extract. This module only hands raw text to the field extractor;
//! extraction quality is the collaborator's problem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::OrdersConfig;

/// File extensions the order processor picks up.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Raw-text extraction from a scanned document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Tesseract CLI for images, pdf-extract for PDFs.
pub struct TesseractOcr {
    tesseract_cmd: String,
    lang: String,
}

impl TesseractOcr {
    pub fn new(config: &OrdersConfig) -> Self {
        Self {
            tesseract_cmd: config
                .tesseract_cmd
                .clone()
                .unwrap_or_else(|| "tesseract".to_string()),
            lang: config.ocr_lang.clone(),
        }
    }

    async fn extract_from_image(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.tesseract_cmd)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await
            .map_err(|e| AppError::extract(path.display().to_string(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::extract(
                path.display().to_string(),
                format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn extract_from_pdf(&self, path: &Path) -> Result<String> {
        let path: PathBuf = path.to_path_buf();
        let display = path.display().to_string();
        // pdf-extract is synchronous; keep it off the scheduler thread.
        tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
            .await
            .map_err(|e| AppError::extract(display.clone(), e))?
            .map_err(|e| AppError::extract(display, e))
    }
}

#[async_trait]
impl TextExtractor for TesseractOcr {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => self.extract_from_pdf(path).await,
            "png" | "jpg" | "jpeg" | "tiff" | "bmp" => self.extract_from_image(path).await,
            other => Err(AppError::extract(
                path.display().to_string(),
                format!("unsupported file extension: {other:?}"),
            )),
        }
    }
}

/// True when the path carries an extension the order processor handles.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
