//! Provider identity
//!
//! Identifies which backend produced a piece of generated text

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation backend, in fallback priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    /// Primary chat-completion provider
    #[serde(rename = "OpenAI")]
    OpenAI,
    /// Secondary hosted-inference provider
    #[serde(rename = "HuggingFace")]
    HuggingFace,
    /// Tertiary provider, same transport family as the secondary one
    #[serde(rename = "Mistral API")]
    MistralApi,
}

impl ProviderId {
    /// All providers in priority order
    pub const PRIORITY: [ProviderId; 3] = [ProviderId::OpenAI, ProviderId::HuggingFace, ProviderId::MistralApi];

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "OpenAI",
            ProviderId::HuggingFace => "HuggingFace",
            ProviderId::MistralApi => "Mistral API",
        }
    }

    /// Status line shown to the user when this provider handles a request
    pub fn status_message(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "💡 Using OpenAI GPT-3.5 (primary)",
            ProviderId::HuggingFace => "⚙️ Using HuggingFace Mistral (fallback)",
            ProviderId::MistralApi => "🚀 Using Mistral API (final fallback)",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
