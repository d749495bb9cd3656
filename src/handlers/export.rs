//! CSV export handler

use crate::handlers::AppState;
use crate::services::assembler::{to_csv, to_csv_with_categories, EXPORT_FILENAME};
use crate::utils::error::AppResult;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Export options
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Add the seven category columns
    #[serde(default)]
    pub include_categories: bool,
}

/// Download the session's records as CSV
///
/// GET /api/sessions/:id/export
pub async fn export_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> AppResult<impl IntoResponse> {
    let session = state.sessions.get(id).await?;

    let body = if query.include_categories {
        to_csv_with_categories(&session.records)?
    } else {
        to_csv(&session.records)?
    };

    info!("Exporting {} records ({} bytes)", session.records.len(), body.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}
