use crate::documents::{file_extension, ExtractorRegistry};
use crate::types::{AppError, AppResult};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bytes of a user upload together with the name it was submitted under.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its final path component as the
    /// upload name.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::ReadFailure(format!("Not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::ReadFailure(format!("Could not read {}: {}", path.display(), e))
        })?;
        Ok(Self::new(filename, bytes))
    }

    /// Lower-cased extension of the original filename, with leading dot.
    pub fn extension(&self) -> String {
        file_extension(&self.filename)
    }
}

/// Stage `upload` in a temporary file carrying the original extension, run the
/// registry on it and remove the file again. The temporary file is dropped
/// (and deleted) on every return path.
pub async fn extract_upload(registry: &ExtractorRegistry, upload: &UploadedFile) -> AppResult<String> {
    let extension = upload.extension();
    info!(filename = %upload.filename, bytes = upload.bytes.len(), "Processing upload");

    if !registry.supports(&extension) {
        return Err(AppError::UnsupportedType(extension));
    }

    let mut staged = tempfile::Builder::new()
        .prefix("student-assist-upload-")
        .suffix(&extension)
        .tempfile()?;
    staged.write_all(&upload.bytes)?;
    staged.flush()?;
    debug!(path = %staged.path().display(), "Staged upload");

    let result = registry.extract(staged.path(), &extension).await;

    if let Err(e) = staged.close() {
        warn!(error = %e, "Failed to remove staged upload");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::tests::CountingExtractor;
    use crate::documents::TextExtractor;
    use crate::types::ErrorKind;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Remembers the path it was handed and whether the file existed then.
    struct PathRecorder {
        seen: Mutex<Option<(PathBuf, bool, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl TextExtractor for PathRecorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn extract(&self, path: &Path) -> AppResult<String> {
            let contents = std::fs::read(path).unwrap_or_default();
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), path.exists(), contents));
            if self.fail {
                Err(AppError::ReadFailure("Could not read PDF file. bad xref".to_string()))
            } else {
                Ok("extracted".to_string())
            }
        }
    }

    fn recorder_registry(fail: bool) -> (ExtractorRegistry, Arc<PathRecorder>) {
        let recorder = Arc::new(PathRecorder {
            seen: Mutex::new(None),
            fail,
        });
        let mut registry = ExtractorRegistry::new();
        registry.register(".pdf", recorder.clone());
        (registry, recorder)
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_success() {
        let (registry, recorder) = recorder_registry(false);
        let upload = UploadedFile::new("Lecture.PDF", b"%PDF-bytes".to_vec());

        let text = extract_upload(&registry, &upload).await.unwrap();
        assert_eq!(text, "extracted");

        let (path, existed, contents) = recorder.seen.lock().unwrap().clone().unwrap();
        assert!(existed);
        assert_eq!(contents, b"%PDF-bytes");
        assert!(path.to_string_lossy().ends_with(".pdf"));
        assert!(!path.exists(), "temporary upload should be deleted");
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_failure() {
        let (registry, recorder) = recorder_registry(true);
        let upload = UploadedFile::new("broken.pdf", b"garbage".to_vec());

        let err = extract_upload(&registry, &upload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);

        let (path, existed, _) = recorder.seen.lock().unwrap().clone().unwrap();
        assert!(existed);
        assert!(!path.exists(), "temporary upload should be deleted");
    }

    #[tokio::test]
    async fn test_unsupported_upload() {
        let fake = CountingExtractor::new("unused");
        let mut registry = ExtractorRegistry::new();
        registry.register(".pdf", fake.clone());

        let upload = UploadedFile::new("notes.xyz", b"whatever".to_vec());
        let err = extract_upload(&registry, &upload).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert_eq!(err.to_string(), "Unsupported file type: .xyz");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_from_path_keeps_file_name_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chapter1.docx");
        std::fs::write(&path, b"docx-bytes").unwrap();

        let upload = UploadedFile::from_path(&path).await.unwrap();
        assert_eq!(upload.filename, "chapter1.docx");
        assert_eq!(upload.bytes, b"docx-bytes");
        assert_eq!(upload.extension(), ".docx");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = UploadedFile::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
    }
}
