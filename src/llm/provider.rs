use crate::config::LLMConfig;
use crate::llm::google::GeminiChatSession;
use crate::types::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A stateful conversation with a remote model.
///
/// Implementations keep every successful exchange so later prompts are
/// grounded in the earlier ones; callers only ever send the newest prompt.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one assembled prompt and return the model's reply text.
    async fn send_message(&self, prompt: &str) -> AppResult<String>;

    /// Identifier of the model behind the session
    fn model(&self) -> &str;
}

/// Start a chat session from configuration.
///
/// Fails with `ConfigMissing` when no API key is configured; no session is
/// created in that case.
pub fn start_session(config: &LLMConfig) -> AppResult<Arc<dyn ChatSession>> {
    let session = GeminiChatSession::start(
        config.gemini_api_key.as_deref(),
        &config.model,
        &config.system_instruction,
    )?
    .with_api_base(&config.api_base);
    Ok(Arc::new(session))
}
