// Google Gemini chat session
// API Reference: https://ai.google.dev/api/generate-content
//
// The REST endpoint is stateless, so the session keeps the turn history itself
// and replays it with every request. A turn pair is recorded only once the
// model has answered; failed calls leave the history untouched.

use crate::config::DEFAULT_API_BASE;
use crate::llm::provider::ChatSession;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const USER_ROLE: &str = "user";
const MODEL_ROLE: &str = "model";

pub struct GeminiChatSession {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    system_instruction: String,
    history: Mutex<Vec<GeminiContent>>,
}

// Request types for Gemini API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: GeminiContent,
    contents: Vec<&'a GeminiContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

// Response types for Gemini API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiChatSession {
    /// Open a chat session. The system instruction is fixed for the lifetime
    /// of the session.
    pub fn start(api_key: Option<&str>, model: &str, system_instruction: &str) -> AppResult<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::ConfigMissing(
                    "GEMINI_API_KEY not found. Please set it in your .env file.".to_string(),
                )
            })?;

        info!(model, "Starting Gemini chat session");

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.trim_start_matches("models/").to_string(),
            system_instruction: system_instruction.to_string(),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Point the session at a different API host (proxies, tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request<'a>(
        &self,
        history: &'a [GeminiContent],
        user_turn: &'a GeminiContent,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: GeminiContent::text(None, &self.system_instruction),
            contents: history.iter().chain(std::iter::once(user_turn)).collect(),
        }
    }

    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
            return AppError::ApiFailure(format!(
                "Gemini API error ({}): {} (status: {})",
                status,
                error_response.error.message,
                error_response.error.status.as_deref().unwrap_or("unknown")
            ));
        }

        AppError::ApiFailure(format!("Gemini API error ({}): {}", status, error_text))
    }

    fn reply_text(response: GenerateContentResponse) -> AppResult<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(AppError::ApiFailure(format!(
                "Gemini returned no candidates (block reason: {})",
                reason
            )));
        };

        let text = candidate
            .content
            .as_ref()
            .map(GeminiContent::joined_text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ApiFailure(format!(
                "Gemini returned an empty reply (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(&self, prompt: &str) -> AppResult<String> {
        // Held across the request so concurrent sends cannot interleave turns
        let mut history = self.history.lock().await;
        let user_turn = GeminiContent::text(Some(USER_ROLE), prompt);
        let request = self.build_request(&history, &user_turn);

        debug!(
            prompt_len = prompt.len(),
            history_turns = history.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ApiFailure(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            warn!(error = %err, "Gemini call failed");
            return Err(err);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ApiFailure(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(usage) = &body.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini reply received"
            );
        }

        let reply = Self::reply_text(body)?;

        history.push(user_turn);
        history.push(GeminiContent::text(Some(MODEL_ROLE), &reply));

        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
