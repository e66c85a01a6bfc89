//! Consistency scoring engine.
//!
//! This module is the analytical core of the benchmark:
//! - Extraction: map raw completion text to a valid answer symbol or
//!   `Unresolved`
//! - Records: the validated question-plus-five-responses unit
//! - Scoring: per-question consistency, majority answer, correctness and
//!   failure classification

pub mod extract;
pub mod record;
pub mod scorer;

pub use extract::extract;
pub use record::{QuestionRecord, RawResponse, RecordResult};
pub use scorer::{score, score_run, ScoredFile, ScoredQuestion};
