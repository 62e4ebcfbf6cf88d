//! Completion-endpoint client.
//!
//! One stable call shape: a system instruction plus a user prompt, answered
//! with free-form text. The [`ChatModel`] trait is the seam the pipelines and
//! tests program against; [`OpenAiClient`] is the production implementation.
//! [`complete_or`] implements the degrade-to-default tier: a provider error is
//! logged and replaced by a caller-supplied fallback so the pipeline never
//! crashes past this point on a model failure.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OpenAiConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion API returned no choices")]
    EmptyResponse,
}

/// A single prompt exchange: one system instruction, one user message, and a
/// response-length cap.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt exchange and return the model's reply text, trimmed.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.api_base);
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
            "max_tokens": request.max_tokens,
        });

        debug!(model = %self.model, max_tokens = request.max_tokens, "sending completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Run a completion, substituting `fallback` on any provider error.
pub async fn complete_or<M: ChatModel + ?Sized>(
    model: &M,
    request: &ChatRequest,
    fallback: &str,
) -> String {
    match model.complete(request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "completion failed, substituting fallback");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel {
        reply: Option<String>,
    }

    #[async_trait]
    impl ChatModel for FixedModel {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            self.reply.clone().ok_or(LlmError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn test_complete_or_passes_reply_through() {
        let model = FixedModel {
            reply: Some("YES".to_string()),
        };
        let request = ChatRequest::new("system", "user", 5);
        assert_eq!(complete_or(&model, &request, "No").await, "YES");
    }

    #[tokio::test]
    async fn test_complete_or_substitutes_fallback_on_error() {
        let model = FixedModel { reply: None };
        let request = ChatRequest::new("system", "user", 5);
        assert_eq!(complete_or(&model, &request, "No").await, "No");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": " YES \n"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, " YES \n");
    }

    #[test]
    fn test_response_deserialization_no_choices() {
        let parsed: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }
}
