//! stylebench: prompt-style consistency benchmark for clinical LLMs.
//!
//! The same clinical question is put to a model in five stylistic
//! rewordings; this library measures whether the answers agree, how often
//! the agreed answer is right, and whether differences between models are
//! statistically significant.

// Core modules
pub mod aggregate;
pub mod cli;
pub mod datasets;
pub mod error;
pub mod export;
pub mod inference;
pub mod prompts;
pub mod scoring;
pub mod stats;
pub mod types;

// Re-export commonly used error types
pub use error::{
    AggregateError, DatasetError, ExportError, LlmError, PromptError, RecordError, StatsError,
};
