// Type definitions and enums

use std::fmt;

/// Category of a failure, independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    ReadFailure,
    OcrEngineMissing,
    ConfigMissing,
    ApiFailure,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnsupportedType => write!(f, "unsupported_type"),
            ErrorKind::ReadFailure => write!(f, "read_failure"),
            ErrorKind::OcrEngineMissing => write!(f, "ocr_engine_missing"),
            ErrorKind::ConfigMissing => write!(f, "config_missing"),
            ErrorKind::ApiFailure => write!(f, "api_failure"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Holds the offending extension, e.g. `.xyz`
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    ReadFailure(String),

    #[error("{0}")]
    OcrEngineMissing(String),

    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    ApiFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            AppError::ReadFailure(_) => ErrorKind::ReadFailure,
            AppError::OcrEngineMissing(_) => ErrorKind::OcrEngineMissing,
            AppError::ConfigMissing(_) => ErrorKind::ConfigMissing,
            AppError::ApiFailure(_) => ErrorKind::ApiFailure,
            AppError::Io(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let err = AppError::UnsupportedType(".xyz".to_string());
        assert_eq!(err.to_string(), "Unsupported file type: .xyz");
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_io_errors_are_internal() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("disk gone"));
    }
}
