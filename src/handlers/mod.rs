//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod export;
pub mod form;
pub mod health;
pub mod session;

use crate::config::Settings;
use crate::middleware::logging::request_logging_middleware;
use crate::services::{DatasetGenerator, Gateway, SessionStore};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub generator: DatasetGenerator,
    pub sessions: SessionStore,
}

/// Create application router with providers built from `settings`
pub async fn create_router(settings: Settings) -> Result<Router> {
    let gateway = Gateway::from_settings(&settings)?;
    Ok(create_router_with_gateway(settings, gateway))
}

/// Create application router around an existing gateway
pub fn create_router_with_gateway(settings: Settings, gateway: Gateway) -> Router {
    info!("Provider chain: {:?}", gateway.provider_ids());

    let generator = DatasetGenerator::new(Arc::new(gateway), settings.generation.question_max_tokens);
    let max_upload_size = settings.request.max_upload_size;
    let sessions = SessionStore::with_ttl_secs(settings.session.ttl);

    let app_state = Arc::new(AppState {
        settings,
        generator,
        sessions,
    });

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(form::index))
        .route("/api/estimate", get(session::estimate))
        .route("/api/sessions", post(session::create_session))
        .route("/api/sessions/:id", get(session::get_session))
        .route("/api/sessions/:id/form", put(session::update_form))
        .route("/api/sessions/:id/document", post(session::upload_document))
        .route("/api/sessions/:id/questions", post(session::generate_questions))
        .route("/api/sessions/:id/answers", post(session::generate_answers))
        .route("/api/sessions/:id/answers/stream", get(session::stream_answers))
        .route("/api/sessions/:id/export", get(export::export_dataset))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .with_state(app_state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_size))
        .layer(middleware_stack)
}
