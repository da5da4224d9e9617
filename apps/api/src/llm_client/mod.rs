/// LLM client: the single point of entry for all Mistral API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Mistral API directly.
/// All model interactions MUST go through this module.
///
/// The client is single-shot: one HTTP round trip per `complete` call, no
/// internal retry. Retry policy lives with the caller (the orchestrator),
/// which paces fields and backs off on 429s.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod models;

const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
/// The model used for all search completions.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "mistral-large-latest";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;
const TOP_P: f32 = 0.9;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by the model API")]
    RateLimited,

    #[error("LLM returned no content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct MistralError {
    error: MistralErrorBody,
}

#[derive(Debug, Deserialize)]
struct MistralErrorBody {
    message: String,
}

/// Pulls the message out of Mistral's `{"error":{"message"}}` envelope,
/// keeping the raw body when it is some other shape.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<MistralError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// A completion backend answering one prompt with one block of free text.
///
/// `MistralClient` is the production implementation; tests inject scripted
/// backends through the same `Arc<dyn CompletionBackend>` held in `AppState`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The single Mistral client used by all services.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    api_key: String,
}

impl MistralClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionBackend for MistralClient {
    /// Makes exactly one call to the Mistral chat completions API.
    /// 429 maps to `LlmError::RateLimited` so the caller can decide whether
    /// and when to retry; other non-2xx statuses map to `LlmError::Api`.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        };

        let response = self
            .client
            .post(MISTRAL_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)?;

        debug!("LLM call succeeded: {} chars of content", content.len());

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_reads_the_envelope() {
        let body = r#"{"error":{"message":"Invalid API key"}}"#.to_string();
        assert_eq!(api_error_message(body), "Invalid API key");
    }

    #[test]
    fn test_api_error_message_keeps_other_bodies_raw() {
        let html = "<html>502 Bad Gateway</html>".to_string();
        assert_eq!(api_error_message(html), "<html>502 Bad Gateway</html>");

        // a message outside the envelope is not extracted
        let flat = r#"{"message":"not the documented shape"}"#.to_string();
        assert_eq!(api_error_message(flat), r#"{"message":"not the documented shape"}"#);
    }
}
