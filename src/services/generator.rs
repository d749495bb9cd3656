//! Dataset generator
//!
//! Builds question and answer prompts from the category hierarchy and runs
//! them through the fallback gateway

use crate::models::{CategorySet, ProviderId};
use crate::providers::GenerationRequest;
use crate::services::gateway::{Gateway, GenerationOutcome};
use crate::utils::error::{AppError, AppResult};
use crate::utils::text::leading_chars;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reference text characters embedded in a prompt
pub const REFERENCE_CHARS: usize = 1500;

/// Largest question set a single request may ask for
pub const MAX_QUESTIONS: u8 = 50;

/// Answer token hint when the difficulty is not known
const DEFAULT_ANSWER_TOKENS: u32 = 400;

/// Generated question list with its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<String>,
    pub provider: ProviderId,
}

/// Progress notification emitted after each answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerProgress {
    /// 1-based index of the question just answered
    pub index: usize,
    pub total: usize,
    pub question: String,
    /// `None` when no provider answered
    pub provider: Option<ProviderId>,
}

impl AnswerProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.index as f64 / self.total as f64
        }
    }
}

/// Prompt asking for `count` questions
///
/// With reference text the prompt grounds the questions in its first
/// `REFERENCE_CHARS` characters; otherwise only the categories are used.
pub fn question_prompt(categories: &CategorySet, reference: Option<&str>, count: u8) -> String {
    let category_str = categories.describe();
    match reference {
        Some(document) => format!(
            "Berdasarkan dokumen berikut dan kategori: {},\n\
             jana {} soalan dalam Bahasa Melayu. Tulis satu soalan setiap baris.\n\n\
             Dokumen:\n{}",
            category_str,
            count,
            leading_chars(document, REFERENCE_CHARS)
        ),
        None => format!(
            "Berdasarkan hierarki kategori Islam berikut:\n{}\n\n\
             Jana {} soalan yang sesuai dalam Bahasa Melayu. Tulis satu soalan setiap baris.",
            category_str, count
        ),
    }
}

/// Prompt asking for the answer to one question
pub fn answer_prompt(question: &str, categories: &CategorySet, document: &str) -> String {
    let guidance = categories
        .difficulty
        .map(|d| d.answer_guidance())
        .unwrap_or("");

    format!(
        "Kategori: {}\n\
         Dokumen: {}\n\
         Soalan: {}\n\
         Jawab dalam Bahasa Melayu dengan jelas, sopan, dan sertakan penjelasan ringkas. {}",
        categories.describe(),
        leading_chars(document, REFERENCE_CHARS),
        question,
        guidance
    )
    .trim_end()
    .to_string()
}

/// Split a raw completion into at most `count` non-blank, trimmed lines
pub fn parse_questions(raw: &str, count: usize) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

/// Dataset generator
#[derive(Clone)]
pub struct DatasetGenerator {
    gateway: Arc<Gateway>,
    question_max_tokens: u32,
}

impl DatasetGenerator {
    pub fn new(gateway: Arc<Gateway>, question_max_tokens: u32) -> Self {
        Self {
            gateway,
            question_max_tokens,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Generate up to `count` questions
    ///
    /// Incomplete categories and out-of-range counts are rejected before any
    /// provider is contacted. Exhaustion is reported as
    /// `AppError::AllProvidersExhausted`.
    pub async fn generate_questions(
        &self,
        categories: &CategorySet,
        reference: Option<&str>,
        count: u8,
    ) -> AppResult<QuestionSet> {
        categories.validate()?;
        if !(1..=MAX_QUESTIONS).contains(&count) {
            return Err(AppError::Validation(format!(
                "Number of questions must be between 1 and {}",
                MAX_QUESTIONS
            )));
        }

        let prompt = question_prompt(categories, reference, count);
        debug!("Question prompt built ({} chars, reference: {})", prompt.chars().count(), reference.is_some());

        match self.gateway.complete(&GenerationRequest::new(prompt, self.question_max_tokens)).await {
            GenerationOutcome::Generated { text, provider } => {
                let questions = parse_questions(&text, usize::from(count));
                info!("✅ Generated {} questions via {}", questions.len(), provider);
                Ok(QuestionSet { questions, provider })
            }
            GenerationOutcome::Exhausted { failures } => {
                warn!("Question generation exhausted all providers ({} failures)", failures.len());
                Err(AppError::AllProvidersExhausted)
            }
        }
    }

    /// Generate the answer to a single question
    pub async fn generate_answer(
        &self,
        question: &str,
        categories: &CategorySet,
        document: &str,
    ) -> GenerationOutcome {
        let max_tokens = categories
            .difficulty
            .map(|d| d.answer_max_tokens())
            .unwrap_or(DEFAULT_ANSWER_TOKENS);
        let prompt = answer_prompt(question, categories, document);

        self.gateway.complete(&GenerationRequest::new(prompt, max_tokens)).await
    }

    /// Answer every question in order, one at a time
    ///
    /// `on_progress` runs after each answer completes. The returned outcomes
    /// are parallel to `questions`.
    pub async fn generate_answers<F>(
        &self,
        questions: &[String],
        categories: &CategorySet,
        document: &str,
        mut on_progress: F,
    ) -> AppResult<Vec<GenerationOutcome>>
    where
        F: FnMut(&AnswerProgress),
    {
        categories.validate()?;
        if questions.is_empty() {
            return Err(AppError::Validation("Generate questions before answers".to_string()));
        }

        let total = questions.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, question) in questions.iter().enumerate() {
            debug!("Generating answer for question {}/{}", i + 1, total);
            let outcome = self.generate_answer(question, categories, document).await;

            on_progress(&AnswerProgress {
                index: i + 1,
                total,
                question: question.clone(),
                provider: outcome.provider(),
            });
            outcomes.push(outcome);
        }

        let answered = outcomes.iter().filter(|o| !o.is_exhausted()).count();
        info!("✅ All answers generated ({}/{} from a provider)", answered, total);

        Ok(outcomes)
    }
}
