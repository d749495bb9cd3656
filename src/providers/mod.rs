//! Provider module
//!
//! Defines the Provider trait and provider implementations

pub mod inference;
pub mod openai;

use crate::models::ProviderId;
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// A single completion request handed to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fully assembled prompt
    pub prompt: String,
    /// Output token hint
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
        }
    }
}

/// Provider trait for upstream text-generation backends
///
/// Implementations return the raw completion text. Every failure, including
/// transport errors and error statuses, is reported as
/// `AppError::ProviderCallFailed` so the gateway can move on.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which backend this is
    fn id(&self) -> ProviderId;

    /// Send one completion request
    async fn generate(&self, request: &GenerationRequest) -> AppResult<String>;
}

pub use inference::InferenceProvider;
pub use openai::OpenAIProvider;
