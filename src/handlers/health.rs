//! Health check handlers
//!
//! Liveness, readiness and a combined status endpoint

use crate::handlers::AppState;
use crate::models::ProviderId;
use crate::utils::error::{AppError, AppResult};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::debug;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Providers in fallback order
    pub providers: Vec<ProviderId>,
    /// Sessions held in memory
    pub sessions: usize,
    pub uptime_seconds: u64,
}

fn response(status: &str, details: Option<HealthDetails>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details,
    }
}

async fn details(state: &AppState) -> HealthDetails {
    HealthDetails {
        providers: state.generator.gateway().provider_ids(),
        sessions: state.sessions.len().await,
        uptime_seconds: uptime_seconds(),
    }
}

/// Basic health check
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");
    Json(response("healthy", Some(details(&state).await)))
}

/// Readiness check
///
/// GET /health/ready
/// Ready once at least one provider is configured
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> AppResult<Json<HealthResponse>> {
    debug!("Executing readiness check");

    if state.generator.gateway().is_empty() {
        return Err(AppError::ProviderUnavailable(
            "no provider credentials configured".to_string(),
        ));
    }

    Ok(Json(response("ready", Some(details(&state).await))))
}

/// Liveness check
///
/// GET /health/live
pub async fn liveness_check() -> Json<HealthResponse> {
    debug!("Executing liveness check");
    Json(response("alive", None))
}

/// Seconds since the first call
fn uptime_seconds() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::{DatasetGenerator, Gateway, SessionStore};

    fn create_test_state(gateway: Gateway) -> Arc<AppState> {
        let settings = Settings::from_lookup(|_| None).unwrap();
        Arc::new(AppState {
            generator: DatasetGenerator::new(Arc::new(gateway), settings.generation.question_max_tokens),
            settings,
            sessions: SessionStore::default(),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = create_test_state(Gateway::new(Vec::new()));
        state.sessions.create(10).await;

        let response = health_check(State(state)).await.0;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "qagen");

        let details = response.details.unwrap();
        assert_eq!(details.sessions, 1);
        assert!(details.providers.is_empty());
    }

    #[tokio::test]
    async fn test_readiness_without_providers() {
        let state = create_test_state(Gateway::new(Vec::new()));
        let err = readiness_check(State(state)).await.unwrap_err();

        assert!(matches!(err, AppError::ProviderUnavailable(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_liveness_check() {
        let response = liveness_check().await.0;
        assert_eq!(response.status, "alive");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_uptime_is_monotonic() {
        let first = uptime_seconds();
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(uptime_seconds() >= first);
    }
}
