use crate::documents::TextExtractor;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Concatenates the text of every page, in page order, with no separator.
pub struct PdfExtractor;

impl PdfExtractor {
    fn extract_pages(path: &Path) -> AppResult<String> {
        let doc = Document::load(path).map_err(read_failure)?;
        let pages = doc.get_pages();
        debug!(page_count = pages.len(), "Loaded PDF");

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = doc.extract_text(&[*page_number]).map_err(read_failure)?;
            // lopdf terminates every text object with a newline; drop the last
            // one so pages butt up against each other
            text.push_str(page_text.strip_suffix('\n').unwrap_or(&page_text));
        }

        Ok(text)
    }
}

fn read_failure(e: lopdf::Error) -> AppError {
    AppError::ReadFailure(format!("Could not read PDF file. {}", e))
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn extract(&self, path: &Path) -> AppResult<String> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_pages(&path))
            .await
            .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    /// Write a PDF with one page per entry; `None` makes a page with no text.
    pub(crate) fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![
                    Operation::new("q", vec![]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_two_pages_concatenate_without_separator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("two_pages.pdf");
        write_pdf(&path, &[Some("Hello"), Some("World")]);

        let text = PdfExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "HelloWorld");
    }

    #[tokio::test]
    async fn test_blank_page_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("with_blank.pdf");
        write_pdf(&path, &[Some("Intro"), None, Some("Summary")]);

        let text = PdfExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "IntroSummary");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfExtractor.extract(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
        assert!(err.to_string().starts_with("Could not read PDF file."));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let err = PdfExtractor
            .extract(&dir.path().join("absent.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
    }
}
