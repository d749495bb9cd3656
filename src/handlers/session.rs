//! Session handlers
//!
//! Form updates, document upload, question generation and answer generation
//! (blocking JSON and SSE progress variants)

use crate::handlers::AppState;
use crate::models::{CategorySet, ProviderId, QARecord};
use crate::services::assembler::assemble;
use crate::services::cost::{estimate_cost, CostEstimate, ANSWER_TOKENS_PER_RESPONSE, DEFAULT_TOKENS_PER_RESPONSE};
use crate::services::extractor::{self, DocumentKind};
use crate::services::generator::MAX_QUESTIONS;
use crate::services::session::{FormState, Session, UploadedDocument};
use crate::services::{AnswerProgress, GenerationOutcome};
use crate::utils::error::{AppError, AppResult, ErrorContext};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Uploaded document summary
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub filename: String,
    pub kind: DocumentKind,
    pub chars: usize,
    /// First characters of the extracted text
    pub preview: String,
}

impl From<&UploadedDocument> for DocumentView {
    fn from(document: &UploadedDocument) -> Self {
        Self {
            filename: document.filename.clone(),
            kind: document.kind,
            chars: document.text.chars().count(),
            preview: extractor::preview(&document.text).to_string(),
        }
    }
}

/// Session snapshot returned to the client
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub form: FormState,
    /// Category keys still empty
    pub missing: Vec<String>,
    pub document: Option<DocumentView>,
    pub questions: Vec<String>,
    pub question_provider: Option<ProviderId>,
    pub records: Vec<QARecord>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            form: session.form.clone(),
            missing: missing_keys(&session.form.categories),
            document: session.document.as_ref().map(DocumentView::from),
            questions: session.questions.clone(),
            question_provider: session.question_provider,
            records: session.records.clone(),
        }
    }
}

/// Form submission
#[derive(Debug, Deserialize)]
pub struct FormUpdate {
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default = "default_reference_mode")]
    pub reference_mode: bool,
    pub num_questions: u8,
}

fn default_reference_mode() -> bool {
    true
}

/// Form validation status
#[derive(Debug, Serialize, Deserialize)]
pub struct FormStatus {
    /// All seven categories filled
    pub ready: bool,
    pub missing: Vec<String>,
    pub estimate: CostEstimate,
}

/// Question generation result
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
    pub provider: ProviderId,
    pub status_message: String,
}

/// Answer generation result
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswersResponse {
    pub records: Vec<QARecord>,
    /// Records answered by a provider
    pub answered: usize,
    /// Records holding the failure placeholder
    pub failed: usize,
    pub estimate: CostEstimate,
}

/// Cost estimate query
#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub num_questions: u32,
    pub avg_tokens: Option<u32>,
}

fn missing_keys(categories: &CategorySet) -> Vec<String> {
    categories.missing().into_iter().map(str::to_string).collect()
}

fn validate_question_count(count: u8) -> AppResult<()> {
    if (1..=MAX_QUESTIONS).contains(&count) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Number of questions must be between 1 and {}",
            MAX_QUESTIONS
        )))
    }
}

/// Create a session
///
/// POST /api/sessions
pub async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create(state.settings.generation.default_questions).await;
    info!("Session created: {}", session.id);
    (StatusCode::CREATED, Json(SessionView::from(&session)))
}

/// Session snapshot
///
/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// Store form values
///
/// PUT /api/sessions/:id/form
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<FormUpdate>,
) -> AppResult<Json<FormStatus>> {
    validate_question_count(update.num_questions)?;

    let missing = missing_keys(&update.categories);
    let estimate = estimate_cost(u32::from(update.num_questions), DEFAULT_TOKENS_PER_RESPONSE);

    state.sessions.update(id, |session| {
        session.form = FormState {
            categories: update.categories,
            reference_mode: update.reference_mode,
            num_questions: update.num_questions,
        };
    }).await?;

    if !missing.is_empty() {
        debug!("Session {} form incomplete: {:?}", id, missing);
    }

    Ok(Json(FormStatus {
        ready: missing.is_empty(),
        missing,
        estimate,
    }))
}

/// Upload a reference document
///
/// POST /api/sessions/:id/document (multipart, field `file`)
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<DocumentView>> {
    // Reject unknown sessions before reading the body
    state.sessions.get(id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .validation_context("Invalid multipart body")?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .validation_context("Failed to read upload")?;

        info!("Extracting text from {} ({} bytes)", filename, bytes.len());
        let (kind, text) = extractor::extract_upload(&filename, &bytes)?;

        let document = UploadedDocument { filename, kind, text };
        let view = DocumentView::from(&document);

        state.sessions.update(id, |session| session.document = Some(document)).await?;

        info!("✅ Document uploaded successfully ({} chars)", view.chars);
        return Ok(Json(view));
    }

    Err(AppError::Validation("No file field in upload".to_string()))
}

/// Generate questions from the stored form
///
/// POST /api/sessions/:id/questions
pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QuestionsResponse>> {
    let session = state.sessions.get(id).await?;

    let question_set = state
        .generator
        .generate_questions(&session.form.categories, session.reference_text(), session.form.num_questions)
        .await?;

    let questions = question_set.questions.clone();
    let provider = question_set.provider;
    state.sessions.update(id, |session| {
        session.questions = questions;
        session.question_provider = Some(provider);
        session.records.clear();
    }).await?;

    Ok(Json(QuestionsResponse {
        questions: question_set.questions,
        provider,
        status_message: provider.status_message().to_string(),
    }))
}

/// Assemble records from `outcomes` and store them in the session
async fn store_answers(
    state: &AppState,
    session: &Session,
    outcomes: &[GenerationOutcome],
) -> AppResult<AnswersResponse> {
    let source = session.document.as_ref().map(|d| d.text.as_str()).unwrap_or("");
    let records = assemble(
        &session.questions,
        outcomes,
        &session.form.categories,
        session.form.reference_mode,
        source,
    )?;

    let answered = records.iter().filter(|r| r.is_generated()).count();
    let failed = records.len() - answered;
    if failed > 0 {
        warn!("{} of {} answers fell back to the placeholder", failed, records.len());
    }

    // Questions regenerated mid-run make these records stale
    let stored = records.clone();
    let current = state.sessions.update(session.id, |s| {
        let current = s.questions == session.questions;
        if current {
            s.records = stored;
        }
        current
    }).await?;

    if !current {
        warn!("Session {} questions changed during answer generation, discarding answers", session.id);
        return Err(AppError::Validation(
            "Questions changed while answers were being generated".to_string(),
        ));
    }

    Ok(AnswersResponse {
        estimate: estimate_cost(records.len() as u32, ANSWER_TOKENS_PER_RESPONSE),
        records,
        answered,
        failed,
    })
}

/// Answer every stored question
///
/// POST /api/sessions/:id/answers
pub async fn generate_answers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AnswersResponse>> {
    let session = state.sessions.get(id).await?;
    let document = session.reference_text().unwrap_or("");

    let outcomes = state
        .generator
        .generate_answers(&session.questions, &session.form.categories, document, |progress| {
            info!(
                "Generating answer for question {}/{} ({})",
                progress.index,
                progress.total,
                progress.provider.map(|p| p.label()).unwrap_or("no model")
            );
        })
        .await?;

    Ok(Json(store_answers(&state, &session, &outcomes).await?))
}

fn json_event(name: &str, payload: &impl Serialize) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(Event::default().event(name).data(json)),
        Err(e) => {
            error!("Event serialization failed: {}", e);
            None
        }
    }
}

/// Answer every stored question, streaming progress
///
/// GET /api/sessions/:id/answers/stream
///
/// Emits one `progress` event per answered question, then `done` with the
/// full result, or `error` if assembly fails.
pub async fn stream_answers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Sse<ReceiverStream<Result<Event, Infallible>>>> {
    let session = state.sessions.get(id).await?;
    session.form.categories.validate()?;
    if session.questions.is_empty() {
        return Err(AppError::Validation("Generate questions before answers".to_string()));
    }

    // One slot per progress event plus the final event, so sends never block
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(session.questions.len() + 2);

    tokio::spawn(async move {
        let document = session.reference_text().unwrap_or("");
        let progress_tx = tx.clone();

        let result = state
            .generator
            .generate_answers(&session.questions, &session.form.categories, document, |progress: &AnswerProgress| {
                if let Some(event) = json_event("progress", progress) {
                    if progress_tx.try_send(Ok(event)).is_err() {
                        debug!("Client disconnected");
                    }
                }
            })
            .await;

        let final_event = match result {
            Ok(outcomes) => match store_answers(&state, &session, &outcomes).await {
                Ok(response) => json_event("done", &response),
                Err(e) => json_event("error", &e.to_error_response()),
            },
            Err(e) => json_event("error", &e.to_error_response()),
        };

        if let Some(event) = final_event {
            let _ = tx.send(Ok(event)).await;
        }
    });

    debug!("Starting answer progress stream for session {}", id);
    Ok(Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// Cost estimate for a question count
///
/// GET /api/estimate?num_questions=30&avg_tokens=500
pub async fn estimate(Query(query): Query<EstimateQuery>) -> AppResult<Json<CostEstimate>> {
    if query.num_questions == 0 || query.num_questions > u32::from(MAX_QUESTIONS) {
        return Err(AppError::Validation(format!(
            "Number of questions must be between 1 and {}",
            MAX_QUESTIONS
        )));
    }

    let tokens = query.avg_tokens.unwrap_or(DEFAULT_TOKENS_PER_RESPONSE);
    Ok(Json(estimate_cost(query.num_questions, tokens)))
}
