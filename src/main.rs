//! Q&A Dataset Generator Server
//!
//! Serves the interactive form and session API for building question/answer
//! datasets

use anyhow::{Context, Result};
use qagen::{create_router, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load settings")?;

    init_logging(&settings.logging.level, &settings.logging.format)?;
    info!("{}", qagen::version_info());

    settings.warn_missing_credentials();
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app = create_router(settings).await?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Dataset generator started!");
    info!("📝 Form: http://{}/", addr);
    info!("📝 Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging(level: &str, format: &str) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .with_target(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Logging system initialized");
    Ok(())
}
