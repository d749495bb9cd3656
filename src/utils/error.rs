//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Uploaded document type is not one of pdf, docx, txt or spreadsheet
    #[error("Unsupported file type: {0}. Please upload PDF, DOCX, TXT or XLSX.")]
    UnsupportedFormat(String),

    /// Document could not be parsed
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// No provider is configured
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A single provider call failed (transport, auth, quota, empty reply)
    #[error("{provider} call failed: {message}")]
    ProviderCallFailed {
        provider: String,
        message: String,
    },

    /// Every configured provider failed
    #[error("All models failed. Please check your API keys and network connection.")]
    AllProvidersExhausted,

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProviderUnavailable(_)
            | AppError::AllProvidersExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProviderCallFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Csv(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat(_) => "unsupported_format_error",
            AppError::Extraction(_) => "extraction_error",
            AppError::Validation(_) => "invalid_request_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::ProviderUnavailable(_) => "provider_unavailable_error",
            AppError::ProviderCallFailed { .. } => "provider_error",
            AppError::AllProvidersExhausted => "overloaded_error",
            AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Csv(_)
            | AppError::Internal(_) => "api_error",
        }
    }

    /// Whether the error is the user's to fix (logged at warn instead of error)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Convert to response body
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            response_type: "error".to_string(),
            error: ErrorDetail {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
            },
        }
    }

    /// Build a provider failure
    pub fn provider_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ProviderCallFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_client_error() {
            tracing::warn!("Client error: {} - Status code: {}", self, status);
        } else {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add validation error context
    fn validation_context(self, message: &str) -> AppResult<T>;

    /// Add extraction error context
    fn extraction_context(self, message: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn validation_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Validation(format!("{}: {}", message, e)))
    }

    fn extraction_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Extraction(format!("{}: {}", message, e)))
    }
}
