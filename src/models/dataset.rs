//! Dataset domain types
//!
//! The seven-level category hierarchy and the question/answer record built from it

use crate::models::ProviderId;
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Question difficulty (category level 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Simple,
    Medium,
    Complex,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Simple, Difficulty::Medium, Difficulty::Complex];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Simple => "Simple",
            Difficulty::Medium => "Medium",
            Difficulty::Complex => "Complex",
        }
    }

    /// Instruction appended to answer prompts
    pub fn answer_guidance(&self) -> &'static str {
        match self {
            Difficulty::Simple => "Provide a long, detailed answer with direct explanations.",
            Difficulty::Medium => "Provide a long, detailed answer considering multiple scenarios.",
            Difficulty::Complex => "Provide a long, detailed answer with a clear reasoning process, step-by-step.",
        }
    }

    /// Output token hint for answers at this difficulty
    pub fn answer_max_tokens(&self) -> u32 {
        match self {
            Difficulty::Simple => 400,
            Difficulty::Medium => 550,
            Difficulty::Complex => 700,
        }
    }
}

/// Kind of data the pair exercises (category level 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "Penafian keselamatan")]
    SafetyDisclaimer,
    #[serde(rename = "Pengesanan serangan berat sebelah")]
    BiasAttackDetection,
    #[serde(rename = "Perbincangan ilmu budaya")]
    CulturalKnowledge,
    #[serde(rename = "Pengesanan maklumat palsu")]
    MisinformationDetection,
    #[serde(rename = "Bimbingan nilai positif")]
    PositiveValueGuidance,
    #[serde(rename = "Pemahaman dasar dan system")]
    PolicyUnderstanding,
    #[serde(rename = "Penerangan neutral dan objektif")]
    NeutralExplanation,
}

impl DataType {
    pub const ALL: [DataType; 7] = [
        DataType::SafetyDisclaimer,
        DataType::BiasAttackDetection,
        DataType::CulturalKnowledge,
        DataType::MisinformationDetection,
        DataType::PositiveValueGuidance,
        DataType::PolicyUnderstanding,
        DataType::NeutralExplanation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DataType::SafetyDisclaimer => "Penafian keselamatan",
            DataType::BiasAttackDetection => "Pengesanan serangan berat sebelah",
            DataType::CulturalKnowledge => "Perbincangan ilmu budaya",
            DataType::MisinformationDetection => "Pengesanan maklumat palsu",
            DataType::PositiveValueGuidance => "Bimbingan nilai positif",
            DataType::PolicyUnderstanding => "Pemahaman dasar dan system",
            DataType::NeutralExplanation => "Penerangan neutral dan objektif",
        }
    }
}

/// Seven-level classification attached to every generated pair
///
/// Free-text levels default to empty and the two enumerated levels to unset,
/// so a partially filled form deserializes and can report what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    #[serde(default)]
    pub core_capability: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub data_type: Option<DataType>,
}

impl CategorySet {
    /// Category keys in display order
    pub const KEYS: [&'static str; 7] = [
        "Tahap 1: Keupayaan Teras",
        "Tahap 2: Domain",
        "Tahap 3: Tema",
        "Tahap 4: Senario/Entiti Tertentu",
        "Difficulty",
        "Strategi",
        "Jenis Data",
    ];

    /// Key/value pairs in display order; unset values are empty strings
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        let keys = Self::KEYS;
        [
            (keys[0], self.core_capability.trim()),
            (keys[1], self.domain.trim()),
            (keys[2], self.theme.trim()),
            (keys[3], self.scenario.trim()),
            (keys[4], self.difficulty.as_ref().map(Difficulty::label).unwrap_or("")),
            (keys[5], self.strategy.trim()),
            (keys[6], self.data_type.as_ref().map(DataType::label).unwrap_or("")),
        ]
    }

    /// Keys whose value is empty
    pub fn missing(&self) -> Vec<&'static str> {
        self.entries()
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Reject the set unless all seven levels are filled
    pub fn validate(&self) -> AppResult<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Please fill in all 7 category levels before proceeding (missing: {})",
                missing.join(", ")
            )))
        }
    }

    /// `key: value` pairs joined for prompt embedding
    pub fn describe(&self) -> String {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Answer text recorded when no provider could answer
pub const ANSWER_PLACEHOLDER: &str = "Model failed to respond.";

/// One generated question/answer pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QARecord {
    pub question: String,
    pub answer: String,
    pub categories: CategorySet,
    /// Full reference document text in reference mode, empty otherwise
    pub source: String,
    /// Provider that produced the answer; `None` when `answer` is the placeholder
    pub provider: Option<ProviderId>,
}

impl QARecord {
    pub fn is_generated(&self) -> bool {
        self.provider.is_some()
    }
}
