use crate::documents::TextExtractor;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use std::path::Path;

/// Emits each top-level body paragraph followed by a newline. Paragraphs
/// nested inside tables are not visited.
pub struct DocxExtractor;

impl DocxExtractor {
    fn extract_paragraphs(path: &Path) -> AppResult<String> {
        let file = DocxFile::from_file(path).map_err(read_failure)?;
        let docx = file.parse().map_err(read_failure)?;

        let mut text = String::new();
        for content in &docx.document.body.content {
            if let BodyContent::Paragraph(paragraph) = content {
                for run_text in paragraph.iter_text() {
                    text.push_str(run_text);
                }
                text.push('\n');
            }
        }

        Ok(text)
    }
}

fn read_failure(e: docx_rust::DocxError) -> AppError {
    AppError::ReadFailure(format!("Could not read DOCX file. {}", e))
}

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    async fn extract(&self, path: &Path) -> AppResult<String> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_paragraphs(&path))
            .await
            .map_err(|e| AppError::Internal(format!("DOCX extraction task failed: {}", e)))?
    }
}
