//! Hosted inference data models
//!
//! Text-generation request and response structures used by the secondary
//! and tertiary providers

use serde::{Deserialize, Serialize};

/// Text-generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationRequest {
    /// Raw prompt
    pub inputs: String,
    /// Generation parameters
    pub parameters: TextGenerationParameters,
}

/// Text-generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    /// Return only the continuation, not the prompt echoed back
    pub return_full_text: bool,
}

/// A single generated sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Error body returned by the inference endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceError {
    pub error: String,
    #[serde(default)]
    pub estimated_time: Option<f64>,
}

/// Text-generation response
///
/// The endpoint answers with a list for batched inputs and a bare object
/// otherwise; errors come back as `{"error": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
    Error(InferenceError),
}

impl TextGenerationResponse {
    /// Extract the generated text or the error message
    pub fn into_text(self) -> Result<String, String> {
        match self {
            TextGenerationResponse::Batch(items) => items
                .into_iter()
                .next()
                .map(|item| item.generated_text)
                .ok_or_else(|| "empty generation list".to_string()),
            TextGenerationResponse::Single(item) => Ok(item.generated_text),
            TextGenerationResponse::Error(err) => Err(err.error),
        }
    }
}
