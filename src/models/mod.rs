//! Data models module
//!
//! Defines provider wire formats and the dataset domain types

pub mod dataset;
pub mod inference;
pub mod openai;
pub mod provider;

pub use dataset::{CategorySet, DataType, Difficulty, QARecord};
pub use provider::ProviderId;
