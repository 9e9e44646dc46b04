//! Image OCR
//!
//! Decodes the upload with `image`, re-encodes it as PNG into a scratch file
//! and runs the tesseract command line on it. A missing engine is reported as
//! [`AppError::OcrEngineMissing`] so the caller can tell "OCR unavailable"
//! apart from "this image could not be read".

use crate::documents::TextExtractor;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

pub struct OcrExtractor {
    command: String,
    language: String,
}

impl OcrExtractor {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// The decoder is chosen from the file contents, not the extension.
    fn normalize_image(source: &Path, target: &Path) -> AppResult<()> {
        let image = ImageReader::open(source)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| AppError::ReadFailure(format!("Could not process image. {}", e)))?
            .decode()
            .map_err(process_failure)?;
        debug!(width = image.width(), height = image.height(), "Decoded image");
        image
            .save_with_format(target, ImageFormat::Png)
            .map_err(process_failure)
    }

    fn engine_missing(&self) -> AppError {
        AppError::OcrEngineMissing(format!(
            "Tesseract is not installed or not in PATH ({}). OCR is unavailable.",
            self.command
        ))
    }

    fn locate_engine(&self) -> AppResult<PathBuf> {
        which::which(&self.command).map_err(|_| self.engine_missing())
    }
}

fn process_failure(e: image::ImageError) -> AppError {
    AppError::ReadFailure(format!("Could not process image. {}", e))
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn extract(&self, path: &Path) -> AppResult<String> {
        let normalized = tempfile::Builder::new()
            .prefix("student-assist-ocr-")
            .suffix(".png")
            .tempfile()?;

        let source = path.to_path_buf();
        let target = normalized.path().to_path_buf();
        tokio::task::spawn_blocking(move || Self::normalize_image(&source, &target))
            .await
            .map_err(|e| AppError::Internal(format!("image decode task failed: {}", e)))??;

        let engine = self.locate_engine()?;
        let output = Command::new(&engine)
            .arg(normalized.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => self.engine_missing(),
                _ => AppError::ReadFailure(format!("Could not process image. {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ReadFailure(format!(
                "Could not process image. tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
