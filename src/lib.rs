// Student Assist - Document-grounded study assistant backed by Gemini

pub mod config;
pub mod documents; // PDF, DOCX and OCR text extraction
pub mod llm;
pub mod session; // Per-user conversation and document context
pub mod tui; // Terminal User Interface
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use session::StudySession;
pub use types::{AppError, AppResult, ErrorKind};
