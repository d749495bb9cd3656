//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Primary (chat completion) provider configuration
    pub openai: OpenAIConfig,
    /// Secondary and tertiary (hosted inference) provider configuration
    pub inference: InferenceConfig,
    /// Generation defaults
    pub generation: GenerationConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Session store configuration
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Primary provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key; `None` disables the provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Chat model name
    pub model: String,
}

/// Hosted inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Access token shared by both inference providers; `None` disables them
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Secondary provider base URL (model path is appended)
    pub base_url: String,
    /// Secondary provider model
    pub model: String,
    /// Tertiary provider base URL (model path is appended)
    pub tertiary_base_url: String,
    /// Tertiary provider model
    pub tertiary_model: String,
    /// Whether the tertiary provider is part of the chain
    pub tertiary_enabled: bool,
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Output token hint for question generation
    pub question_max_tokens: u32,
    /// Question count preselected in the form
    pub default_questions: u8,
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum upload size in bytes
    pub max_upload_size: usize,
    /// Upstream request timeout in seconds
    pub timeout: u64,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session is dropped
    pub ttl: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let credential = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let hf_model = get("HF_MODEL", "mistralai/Mistral-7B-Instruct-v0.2");

        let settings = Self {
            server: ServerConfig {
                host: get("SERVER_HOST", "127.0.0.1"),
                port: get("SERVER_PORT", "8501")
                    .parse()
                    .context("Invalid port number")?,
            },
            openai: OpenAIConfig {
                api_key: credential("OPENAI_API_KEY"),
                base_url: get("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: get("OPENAI_MODEL", "gpt-3.5-turbo"),
            },
            inference: InferenceConfig {
                token: credential("HF_API_KEY"),
                base_url: get("HF_INFERENCE_URL", "https://api-inference.huggingface.co/models"),
                tertiary_base_url: get("MISTRAL_API_URL", "https://router.huggingface.co/hf-inference/models"),
                tertiary_model: get("MISTRAL_MODEL", &hf_model),
                tertiary_enabled: get("TERTIARY_ENABLED", "true")
                    .parse()
                    .context("Invalid tertiary enabled flag")?,
                model: hf_model,
            },
            generation: GenerationConfig {
                question_max_tokens: get("QUESTION_MAX_TOKENS", "300")
                    .parse()
                    .context("Invalid question max tokens")?,
                default_questions: get("DEFAULT_QUESTIONS", "30")
                    .parse()
                    .context("Invalid default question count")?,
            },
            request: RequestConfig {
                max_upload_size: get("MAX_UPLOAD_SIZE", "20971520")
                    .parse()
                    .context("Invalid maximum upload size")?,
                timeout: get("REQUEST_TIMEOUT", "60")
                    .parse()
                    .context("Invalid request timeout")?,
            },
            session: SessionConfig {
                ttl: get("SESSION_TTL", "3600")
                    .parse()
                    .context("Invalid session TTL")?,
            },
            logging: LoggingConfig {
                level: get("RUST_LOG", "info"),
                format: get("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        for (name, credential) in [
            ("OPENAI_API_KEY", &self.openai.api_key),
            ("HF_API_KEY", &self.inference.token),
        ] {
            if let Some(value) = credential {
                if value.contains(char::is_whitespace) {
                    anyhow::bail!("{} cannot contain whitespace characters", name);
                }
            }
        }

        for (name, url) in [
            ("OPENAI_BASE_URL", &self.openai.base_url),
            ("HF_INFERENCE_URL", &self.inference.base_url),
            ("MISTRAL_API_URL", &self.inference.tertiary_base_url),
        ] {
            if !url.starts_with("http") {
                anyhow::bail!("Invalid {} format, should start with 'http'", name);
            }
        }

        if self.request.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.session.ttl == 0 {
            anyhow::bail!("Session TTL cannot be 0");
        }

        if self.request.max_upload_size == 0 {
            anyhow::bail!("Maximum upload size cannot be 0");
        }

        if self.generation.question_max_tokens == 0 {
            anyhow::bail!("Question max tokens cannot be 0");
        }

        if !(1..=50).contains(&self.generation.default_questions) {
            anyhow::bail!("Default question count must be between 1 and 50");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Log one warning per provider group disabled by a missing credential
    pub fn warn_missing_credentials(&self) {
        if self.openai.api_key.is_none() {
            warn!("⚠️ OPENAI_API_KEY missing, OpenAI disabled.");
        }
        if self.inference.token.is_none() {
            warn!("⚠️ HF_API_KEY not found, skipping HuggingFace and Mistral API setup.");
        }
    }

    /// Number of providers the configured credentials enable
    pub fn enabled_provider_count(&self) -> usize {
        let primary = usize::from(self.openai.api_key.is_some());
        let inference = match (&self.inference.token, self.inference.tertiary_enabled) {
            (Some(_), true) => 2,
            (Some(_), false) => 1,
            (None, _) => 0,
        };
        primary + inference
    }
}
