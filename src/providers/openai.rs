//! OpenAI Provider implementation
//!
//! Primary provider speaking the chat completion API

use super::{GenerationRequest, Provider};
use crate::config::settings::OpenAIConfig;
use crate::models::openai::*;
use crate::models::ProviderId;
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::chat_request_log_summary;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed system instruction; responses are always in Bahasa Melayu
pub const SYSTEM_INSTRUCTION: &str =
    "Anda ialah pembantu yang menjawab soalan Islam dalam Bahasa Melayu.";

/// OpenAI Provider
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(config: &OpenAIConfig, api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("qagen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    /// Build the request URL
    fn build_url(&self) -> String {
        let base_url = self.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base_url)
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(request.prompt.clone()),
            ],
            max_completion_tokens: Some(request.max_tokens),
            temperature: None,
        }
    }

    fn failure(&self, message: impl Into<String>) -> AppError {
        AppError::provider_failed(self.id().label(), message)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<String> {
        let chat_request = self.build_request(request);
        debug!("Sending OpenAI chat completion request: {}", chat_request_log_summary(&chat_request));

        let response = self.client
            .post(self.build_url())
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| self.failure(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(error_response) => format!("{} - {}", status, error_response.error.message),
                Err(_) => format!("{} - {}", status, error_text),
            };
            warn!("OpenAI API request failed: {}", message);
            return Err(self.failure(message));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.failure(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = chat_response
            .first_content()
            .ok_or_else(|| self.failure("Response contained no message content"))?;

        debug!("✅ OpenAI response successful");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> OpenAIConfig {
        OpenAIConfig {
            api_key: None,
            base_url: base_url.to_string(),
            model: "gpt-3.5-turbo".to_string(),
        }
    }

    #[test]
    fn test_provider_id() {
        let provider = OpenAIProvider::new(&test_config("https://api.openai.com/v1"), "sk-test", 30).unwrap();
        assert_eq!(provider.id(), ProviderId::OpenAI);
    }

    #[test]
    fn test_build_url() {
        let provider = OpenAIProvider::new(&test_config("https://api.openai.com/v1"), "sk-test", 30).unwrap();
        assert_eq!(provider.build_url(), "https://api.openai.com/v1/chat/completions");

        // Test with trailing slash
        let provider = OpenAIProvider::new(&test_config("https://api.openai.com/v1/"), "sk-test", 30).unwrap();
        assert_eq!(provider.build_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_build_request_carries_system_instruction() {
        let provider = OpenAIProvider::new(&test_config("https://api.openai.com/v1"), "sk-test", 30).unwrap();
        let request = provider.build_request(&GenerationRequest::new("Apakah Rukun Iman?", 300));

        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.messages[0], ChatMessage::system(SYSTEM_INSTRUCTION));
        assert_eq!(request.messages[1].content, "Apakah Rukun Iman?");
        assert_eq!(request.max_completion_tokens, Some(300));
    }
}
