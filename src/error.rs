//! Error types for stylebench operations.
//!
//! Defines error types for all major subsystems:
//! - Dataset collection and sampling
//! - Prompt rendering
//! - LLM inference transport
//! - Question record construction
//! - Aggregation
//! - Significance testing
//! - Tabular export

use thiserror::Error;

use crate::types::PromptStyle;

/// Errors that can occur while collecting or sampling datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limited by upstream API{}", retry_after.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Dataset '{dataset}' returned no usable rows")]
    EmptyDataset { dataset: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while rendering prompt variants.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template rendering failed for style '{style}': {message}")]
    RenderFailed { style: PromptStyle, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during LLM inference.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse completion response: {0}")]
    ParseError(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Unknown model key: {0}")]
    UnknownModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when a question record violates its shape invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Expected 5 responses, got {0}")]
    WrongResponseCount(usize),

    #[error("Duplicate response for style '{0}'")]
    DuplicateStyle(PromptStyle),

    #[error("Missing response for style '{0}'")]
    MissingStyle(PromptStyle),

    #[error("Ground truth '{symbol}' is not valid under scheme '{scheme}'")]
    GroundTruthOutsideScheme { symbol: String, scheme: String },
}

/// Errors that can occur during aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No scored questions to aggregate")]
    EmptyInput,
}

/// Errors that can occur while running significance tests.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("No paired observations between '{left}' and '{right}'")]
    EmptyPairing { left: String, right: String },

    #[error("Scored results for '{0}' not found; run the score stage first")]
    MissingScores(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::WrongResponseCount(3);
        assert_eq!(err.to_string(), "Expected 5 responses, got 3");

        let err = RecordError::DuplicateStyle(PromptStyle::Formal);
        assert_eq!(err.to_string(), "Duplicate response for style 'formal'");
    }

    #[test]
    fn test_rate_limited_message() {
        let err = DatasetError::RateLimited {
            retry_after: Some(30),
        };
        assert!(err.to_string().contains("retry after 30s"));

        let err = DatasetError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "Rate limited by upstream API");
    }
}
