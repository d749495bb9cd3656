//! Q&A Dataset Generator Library
//!
//! Generates categorized question/answer datasets through a prioritized chain
//! of LLM providers and exports them as CSV

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{create_router, create_router_with_gateway, AppState};
pub use models::{CategorySet, ProviderId, QARecord};
pub use providers::{GenerationRequest, Provider};
pub use services::{DatasetGenerator, Gateway, GenerationOutcome};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
