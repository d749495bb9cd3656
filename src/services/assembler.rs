//! Dataset assembler
//!
//! Pairs questions with answers into records and writes them out as CSV

use crate::models::dataset::{CategorySet, QARecord, ANSWER_PLACEHOLDER};
use crate::services::gateway::GenerationOutcome;
use crate::utils::error::{AppError, AppResult};
use serde::Serialize;

/// File name offered for the CSV download
pub const EXPORT_FILENAME: &str = "islamic_llm_dataset.csv";

/// Header of the standard export
pub const EXPORT_COLUMNS: [&str; 3] = ["Question", "Answer", "Source"];

/// One row of the standard export
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Question")]
    question: &'a str,
    #[serde(rename = "Answer")]
    answer: &'a str,
    #[serde(rename = "Source")]
    source: &'a str,
}

/// Build one record per question
///
/// `answers` must be parallel to `questions`. `source` is attached to every
/// record only in reference mode. Exhausted answers become the placeholder
/// text with no provider.
pub fn assemble(
    questions: &[String],
    answers: &[GenerationOutcome],
    categories: &CategorySet,
    reference_mode: bool,
    source: &str,
) -> AppResult<Vec<QARecord>> {
    if questions.len() != answers.len() {
        return Err(AppError::Validation(format!(
            "Question and answer counts differ ({} questions, {} answers)",
            questions.len(),
            answers.len()
        )));
    }

    let source = if reference_mode { source } else { "" };

    Ok(questions
        .iter()
        .zip(answers)
        .map(|(question, outcome)| QARecord {
            question: question.clone(),
            answer: outcome.text().unwrap_or(ANSWER_PLACEHOLDER).to_string(),
            categories: categories.clone(),
            source: source.to_string(),
            provider: outcome.provider(),
        })
        .collect())
}

/// Serialize records as CSV with columns Question, Answer, Source
pub fn to_csv(records: &[QARecord]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record(EXPORT_COLUMNS)?;
    }
    for record in records {
        writer.serialize(ExportRow {
            question: &record.question,
            answer: &record.answer,
            source: &record.source,
        })?;
    }

    finish(writer)
}

/// Serialize records with the seven category columns between Answer and Source
pub fn to_csv_with_categories(records: &[QARecord]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Question", "Answer"];
    header.extend(CategorySet::KEYS);
    header.push("Source");
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.question.as_str(), record.answer.as_str()];
        row.extend(record.categories.entries().iter().map(|(_, value)| *value));
        row.push(record.source.as_str());
        writer.write_record(&row)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV writer: {}", e)))
}
