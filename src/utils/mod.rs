//! Utilities module
//!
//! Contains error handling, log summaries and text helpers

pub mod error;
pub mod logging;
pub mod text;
