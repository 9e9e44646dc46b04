use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Persona handed to the model once, when the chat session starts.
pub const SYSTEM_INSTRUCTION: &str = "You are the Student Assist AI, an expert, encouraging, and highly helpful study partner. \
Your main goal is to assist students with their documents and queries. \
If the user provides context from a file, prioritize that information to answer their questions (this is called RAG). \
If the question is general, use your general knowledge. \
Always maintain a professional, academic, and supportive tone.";

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub system_instruction: String,
}

// Keeps the key out of `{:?}` output
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Command name or absolute path of the tesseract binary
    pub tesseract_cmd: String,
    pub ocr_language: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            llm: LLMConfig {
                gemini_api_key: non_empty("GEMINI_API_KEY"),
                model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: non_empty("GEMINI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                system_instruction: SYSTEM_INSTRUCTION.to_string(),
            },
            extraction: ExtractionConfig {
                tesseract_cmd: non_empty("TESSERACT_CMD").unwrap_or_else(|| "tesseract".to_string()),
                ocr_language: non_empty("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string()),
            },
            logging: LoggingConfig {
                log_dir: non_empty("LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_log_dir),
                filter: non_empty("RUST_LOG").unwrap_or_else(|| "student_assist=info".to_string()),
            },
        })
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("student-assist")
        .join("logs")
}
