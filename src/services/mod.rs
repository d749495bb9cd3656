//! Service layer module
//!
//! Contains the fallback gateway, prompt-driven generator, document extractor,
//! dataset assembler, cost estimator and session store

pub mod assembler;
pub mod cost;
pub mod extractor;
pub mod gateway;
pub mod generator;
pub mod session;

pub use gateway::{Gateway, GenerationOutcome, ProviderFailure};
pub use generator::{AnswerProgress, DatasetGenerator, QuestionSet};
pub use session::{Session, SessionStore};
