//! Hosted inference Provider implementation
//!
//! Text-generation endpoint used by both the secondary and the tertiary
//! provider. The two differ only in endpoint and reported identity.

use super::{GenerationRequest, Provider};
use crate::models::inference::*;
use crate::models::ProviderId;
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::text_generation_log_summary;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Sampling temperature for hosted inference calls
pub const INFERENCE_TEMPERATURE: f64 = 0.7;

/// Hosted inference Provider
pub struct InferenceProvider {
    id: ProviderId,
    client: Client,
    endpoint: String,
    token: String,
}

impl InferenceProvider {
    /// Create a provider posting to `{base_url}/{model}`
    pub fn new(
        id: ProviderId,
        base_url: &str,
        model: &str,
        token: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("qagen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            id,
            client,
            endpoint: build_endpoint(base_url, model),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn failure(&self, message: impl Into<String>) -> AppError {
        AppError::provider_failed(self.id.label(), message)
    }
}

/// Join base URL and model path
fn build_endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        model.trim_start_matches('/')
    )
}

#[async_trait]
impl Provider for InferenceProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<String> {
        let body = TextGenerationRequest {
            inputs: request.prompt.clone(),
            parameters: TextGenerationParameters {
                max_new_tokens: request.max_tokens,
                temperature: INFERENCE_TEMPERATURE,
                return_full_text: false,
            },
        };
        debug!("Sending {} text generation request: {}", self.id, text_generation_log_summary(&body));

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failure(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.failure(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<InferenceError>(&text) {
                Ok(err) => format!("{} - {}", status, err.error),
                Err(_) => format!("{} - {}", status, text),
            };
            warn!("{} request failed: {}", self.id, message);
            return Err(self.failure(message));
        }

        let parsed: TextGenerationResponse = serde_json::from_str(&text)
            .map_err(|e| self.failure(format!("Failed to parse response: {}", e)))?;

        let generated = parsed
            .into_text()
            .map_err(|message| self.failure(message))?;

        debug!("✅ {} response successful", self.id);
        Ok(generated)
    }
}
