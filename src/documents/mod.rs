//! Document Text Extraction
//!
//! Routes an uploaded file to the extractor registered for its extension and
//! normalizes every outcome to extracted text or a typed [`AppError`].
//!
//! ```text
//! .pdf                         → PdfExtractor   (lopdf)
//! .docx                        → DocxExtractor  (docx-rust)
//! .jpg .jpeg .png .tiff .bmp   → OcrExtractor   (image + tesseract)
//! anything else                → AppError::UnsupportedType
//! ```

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod upload;

pub use docx::DocxExtractor;
pub use ocr::OcrExtractor;
pub use pdf::PdfExtractor;
pub use upload::{extract_upload, UploadedFile};

use crate::config::ExtractionConfig;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Extensions accepted by the upload surface.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["pdf", "docx", "jpg", "jpeg", "png", "tiff", "bmp"];

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".tiff", ".bmp"];

/// A routine that turns one file on disk into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn extract(&self, path: &Path) -> AppResult<String>;
}

/// Extension → extractor table.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    routes: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry wired with the PDF, DOCX and OCR extractors.
    pub fn with_defaults(config: &ExtractionConfig) -> Self {
        let pdf: Arc<dyn TextExtractor> = Arc::new(PdfExtractor);
        let docx: Arc<dyn TextExtractor> = Arc::new(DocxExtractor);
        let ocr: Arc<dyn TextExtractor> = Arc::new(OcrExtractor::new(
            config.tesseract_cmd.clone(),
            config.ocr_language.clone(),
        ));

        let mut registry = Self::new();
        registry.register(".pdf", pdf);
        registry.register(".docx", docx);
        for ext in IMAGE_EXTENSIONS {
            registry.register(ext, Arc::clone(&ocr));
        }
        registry
    }

    /// Route `extension` (lower-case, with leading dot) to `extractor`,
    /// replacing any previous route.
    pub fn register(&mut self, extension: &str, extractor: Arc<dyn TextExtractor>) {
        self.routes.insert(extension.to_string(), extractor);
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.routes.contains_key(extension)
    }

    /// Extract text from `path` using the extractor routed for `extension`.
    pub async fn extract(&self, path: &Path, extension: &str) -> AppResult<String> {
        let extractor = self
            .routes
            .get(extension)
            .ok_or_else(|| AppError::UnsupportedType(extension.to_string()))?;

        info!(extractor = extractor.name(), extension, "Extracting document text");

        match extractor.extract(path).await {
            Ok(text) => {
                info!(extractor = extractor.name(), chars = text.chars().count(), "Extraction complete");
                Ok(text)
            }
            Err(e) => {
                warn!(extractor = extractor.name(), kind = %e.kind(), error = %e, "Extraction failed");
                Err(e)
            }
        }
    }
}

/// Lower-cased suffix of `path` including the leading dot, or an empty
/// string when the name has no extension.
pub fn file_extension(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
