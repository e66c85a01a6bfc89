//! Shared types for benchmark dataset collection.
//!
//! All three collectors produce the same normalized row shape so that the
//! prompt builder and scorer never need dataset-specific branches beyond
//! the answer scheme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DatasetError;
use crate::types::{AnswerSymbol, DatasetKind};

/// Result type alias for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Configuration shared by the HuggingFace-backed collectors.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Delay between page requests in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Maximum rows per page request. The rows API caps pages at 100.
    pub max_page_size: usize,
    /// Maximum retry attempts after a rate-limit response.
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 100,
            max_page_size: 100,
            max_retries: 3,
        }
    }
}

/// Question-specific content that varies by answer scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPayload {
    /// Four answer options keyed A through D.
    Options {
        a: String,
        b: String,
        c: String,
        d: String,
    },
    /// Research abstract preceding a yes/no/maybe question.
    Context { text: String },
}

impl QuestionPayload {
    /// Option text for a letter symbol, if this payload has options.
    pub fn option(&self, symbol: AnswerSymbol) -> Option<&str> {
        match self {
            QuestionPayload::Options { a, b, c, d } => match symbol {
                AnswerSymbol::A => Some(a.as_str()),
                AnswerSymbol::B => Some(b.as_str()),
                AnswerSymbol::C => Some(c.as_str()),
                AnswerSymbol::D => Some(d.as_str()),
                _ => None,
            },
            QuestionPayload::Context { .. } => None,
        }
    }

    /// Context text, if this payload has one.
    pub fn context(&self) -> Option<&str> {
        match self {
            QuestionPayload::Context { text } => Some(text.as_str()),
            QuestionPayload::Options { .. } => None,
        }
    }
}

/// One normalized benchmark question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRow {
    /// Row index within the upstream split. Stable across runs, which is
    /// what lets two models' scored outputs be paired question by question.
    pub id: u32,

    /// Which benchmark the question came from.
    pub dataset: DatasetKind,

    /// Question text as published upstream.
    pub question: String,

    /// Options or context, depending on the dataset's scheme.
    pub payload: QuestionPayload,

    /// Gold answer, validated against the dataset's scheme at conversion.
    pub ground_truth: AnswerSymbol,
}

/// A seeded sample of questions, as persisted to `data/processed/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSample {
    /// Which benchmark the sample was drawn from.
    pub dataset: DatasetKind,

    /// Seed used for the shuffle.
    pub seed: u64,

    /// When the sample was drawn.
    pub sampled_at: DateTime<Utc>,

    /// Sampled questions. Order is the shuffled order.
    pub questions: Vec<QuestionRow>,
}

impl QuestionSample {
    /// File name of the persisted sample for a dataset.
    pub fn file_name(dataset: DatasetKind) -> String {
        format!("{}_sample.json", dataset)
    }

    /// Write the sample as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously persisted sample.
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_row() -> QuestionRow {
        QuestionRow {
            id: 17,
            dataset: DatasetKind::MedQa,
            question: "Which vitamin deficiency causes scurvy?".to_string(),
            payload: QuestionPayload::Options {
                a: "Vitamin A".to_string(),
                b: "Vitamin B12".to_string(),
                c: "Vitamin C".to_string(),
                d: "Vitamin D".to_string(),
            },
            ground_truth: AnswerSymbol::C,
        }
    }

    #[test]
    fn test_payload_option_lookup() {
        let row = mcq_row();
        assert_eq!(row.payload.option(AnswerSymbol::B), Some("Vitamin B12"));
        assert_eq!(row.payload.option(AnswerSymbol::Yes), None);
        assert_eq!(row.payload.context(), None);

        let context = QuestionPayload::Context {
            text: "Background text.".to_string(),
        };
        assert_eq!(context.context(), Some("Background text."));
        assert_eq!(context.option(AnswerSymbol::A), None);
    }

    #[test]
    fn test_sample_file_name() {
        assert_eq!(
            QuestionSample::file_name(DatasetKind::PubMedQa),
            "pubmedqa_sample.json"
        );
    }

    #[test]
    fn test_sample_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("medqa_sample.json");

        let sample = QuestionSample {
            dataset: DatasetKind::MedQa,
            seed: 42,
            sampled_at: Utc::now(),
            questions: vec![mcq_row()],
        };
        sample.save(&path).expect("save should succeed");

        let loaded = QuestionSample::load(&path).expect("load should succeed");
        assert_eq!(loaded.dataset, DatasetKind::MedQa);
        assert_eq!(loaded.seed, 42);
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(loaded.questions[0].id, 17);
        assert_eq!(loaded.questions[0].ground_truth, AnswerSymbol::C);
    }

    #[test]
    fn test_default_fetch_config() {
        let config = FetchConfig::default();
        assert_eq!(config.rate_limit_delay_ms, 100);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.max_retries, 3);
    }
}
