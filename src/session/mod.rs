//! Study Session
//!
//! The explicit per-user session object. It owns the conversation shown to
//! the user, the active document context, the chat handle and the extractor
//! registry, and implements the upload → prompt → reply flow:
//!
//! ```text
//! upload ──▶ ExtractorRegistry ──▶ DocumentContext
//!                                        │
//! query ─────────────────────────▶ assemble(query, context)
//!                                        │
//!                                        ▼
//!                                   ChatSession ──▶ ConversationStore
//! ```
//!
//! Every method takes `&mut self`, so a session can serve one request at a
//! time only.

pub mod context;
pub mod conversation;

pub use context::DocumentContext;
pub use conversation::{ChatTurn, ConversationStore, Role};

use crate::config::Config;
use crate::documents::{extract_upload, ExtractorRegistry, UploadedFile};
use crate::llm::{assemble, start_session, ChatSession};
use crate::types::{AppResult, ErrorKind};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Result of a successful document submission
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Text was extracted and replaced any previous context
    Loaded { filename: String, char_count: usize },
    /// A file with this name is already the active context; nothing was done
    AlreadyLoaded { filename: String },
}

/// The assistant's answer to one query, as appended to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Set when `text` is an error notice rather than a model answer
    pub error: Option<ErrorKind>,
}

pub struct StudySession {
    id: Uuid,
    chat: Arc<dyn ChatSession>,
    extractors: Arc<ExtractorRegistry>,
    conversation: ConversationStore,
    document: Option<DocumentContext>,
}

impl StudySession {
    pub fn new(chat: Arc<dyn ChatSession>, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat,
            extractors,
            conversation: ConversationStore::new(),
            document: None,
        }
    }

    /// Start a Gemini-backed session with the default extractors.
    ///
    /// Fails with `ConfigMissing` before anything else is set up when no API
    /// key is configured.
    pub fn start(config: &Config) -> AppResult<Self> {
        let chat = start_session(&config.llm)?;
        let extractors = Arc::new(ExtractorRegistry::with_defaults(&config.extraction));
        let session = Self::new(chat, extractors);
        info!(session_id = %session.id, model = session.chat.model(), "Study session started");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        self.chat.model()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn document(&self) -> Option<&DocumentContext> {
        self.document.as_ref()
    }

    /// Extract `upload` and make it the active document context.
    ///
    /// Re-submitting the file that is already loaded is a no-op. On failure
    /// the previous context is discarded so the user can retry cleanly.
    pub async fn load_document(&mut self, upload: &UploadedFile) -> AppResult<LoadOutcome> {
        if let Some(current) = &self.document {
            if current.filename == upload.filename {
                debug!(session_id = %self.id, filename = %upload.filename, "Document already loaded");
                return Ok(LoadOutcome::AlreadyLoaded {
                    filename: upload.filename.clone(),
                });
            }
        }

        match extract_upload(&self.extractors, upload).await {
            Ok(text) => {
                let context = DocumentContext::new(upload.filename.clone(), text);
                let char_count = context.char_count();
                info!(session_id = %self.id, filename = %context.filename, char_count, "Document context loaded");
                self.document = Some(context);
                Ok(LoadOutcome::Loaded {
                    filename: upload.filename.clone(),
                    char_count,
                })
            }
            Err(e) => {
                self.document = None;
                Err(e)
            }
        }
    }

    /// Ask a question, grounded in the active document when there is one.
    ///
    /// Blank queries are ignored and return `None`. A failed model call is
    /// still answered: the error notice becomes the assistant's turn.
    pub async fn ask(&mut self, query: &str) -> Option<Reply> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.conversation.append(ChatTurn::user(query));
        let prompt = assemble(query, self.document.as_ref().map(|d| d.text.as_str()));
        info!(
            session_id = %self.id,
            query_len = query.len(),
            prompt_len = prompt.len(),
            grounded = self.document.is_some(),
            "Sending query"
        );

        let reply = match self.chat.send_message(&prompt).await {
            Ok(text) => Reply { text, error: None },
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Model call failed");
                Reply {
                    text: format!("An error occurred while calling the Gemini API: {}", e),
                    error: Some(e.kind()),
                }
            }
        };

        self.conversation.append(ChatTurn::assistant(reply.text.clone()));
        Some(reply)
    }

    /// Drop the conversation and the document context together.
    pub fn new_chat(&mut self) {
        info!(session_id = %self.id, "Starting new chat");
        self.conversation.clear();
        self.document = None;
    }
}
