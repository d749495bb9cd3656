//! Model fallback gateway
//!
//! Tries each configured provider in priority order and returns the first
//! non-empty completion, tagged with the provider that produced it

use crate::config::Settings;
use crate::models::ProviderId;
use crate::providers::{GenerationRequest, InferenceProvider, OpenAIProvider, Provider};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One failed provider attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub message: String,
}

/// Result of running a request through the fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// A provider returned non-empty text (already trimmed)
    Generated { text: String, provider: ProviderId },
    /// Every provider failed, or none is configured
    Exhausted { failures: Vec<ProviderFailure> },
}

impl GenerationOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Generated { text, .. } => Some(text),
            GenerationOutcome::Exhausted { .. } => None,
        }
    }

    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            GenerationOutcome::Generated { provider, .. } => Some(*provider),
            GenerationOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, GenerationOutcome::Exhausted { .. })
    }
}

/// Model fallback gateway
///
/// Holds provider instances in priority order
#[derive(Clone)]
pub struct Gateway {
    providers: Vec<Arc<dyn Provider>>,
}

impl Gateway {
    /// Create a gateway trying `providers` in the given order
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Build the chain from configuration
    ///
    /// A missing credential leaves the corresponding provider out of the chain.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = settings.request.timeout;
        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

        if let Some(api_key) = &settings.openai.api_key {
            providers.push(Arc::new(OpenAIProvider::new(&settings.openai, api_key.as_str(), timeout)?));
            info!("✅ OpenAI client initialized.");
        }

        if let Some(token) = &settings.inference.token {
            let inference = &settings.inference;
            providers.push(Arc::new(InferenceProvider::new(
                ProviderId::HuggingFace,
                &inference.base_url,
                &inference.model,
                token.as_str(),
                timeout,
            )?));
            info!("✅ HuggingFace inference client initialized ({}).", inference.model);

            if inference.tertiary_enabled {
                providers.push(Arc::new(InferenceProvider::new(
                    ProviderId::MistralApi,
                    &inference.tertiary_base_url,
                    &inference.tertiary_model,
                    token.as_str(),
                    timeout,
                )?));
                info!("✅ Mistral API client initialized ({}).", inference.tertiary_model);
            }
        }

        if providers.is_empty() {
            warn!("No provider credentials configured; every generation request will be exhausted");
        }

        Ok(Self::new(providers))
    }

    /// Providers in the order they are tried
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run one request through the chain
    ///
    /// Never fails: provider errors are collected and the caller gets
    /// `Exhausted` once the list runs out.
    pub async fn complete(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let id = provider.id();
            debug!("{}", id.status_message());

            match provider.generate(request).await {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        warn!("⚠️ {} returned an empty completion", id);
                        failures.push(ProviderFailure {
                            provider: id,
                            message: "empty completion".to_string(),
                        });
                        continue;
                    }

                    info!("{} ({} chars)", id.status_message(), trimmed.chars().count());
                    return GenerationOutcome::Generated {
                        text: trimmed.to_string(),
                        provider: id,
                    };
                }
                Err(e) => {
                    warn!("⚠️ {} failed: {}", id, e);
                    failures.push(ProviderFailure {
                        provider: id,
                        message: e.to_string(),
                    });
                }
            }
        }

        warn!("❌ No model available ({} providers tried)", failures.len());
        GenerationOutcome::Exhausted { failures }
    }
}
