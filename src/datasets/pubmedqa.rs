//! PubMedQA collector.
//!
//! PubMedQA (pqa_labeled) pairs biomedical research questions with abstract
//! excerpts; the gold answer is yes, no, or maybe. The abstract sections are
//! joined into one context string at conversion time.

use super::huggingface::{HuggingFaceClient, RowEntry};
use super::types::{DatasetResult, QuestionPayload, QuestionRow};
use crate::error::DatasetError;
use crate::types::{AnswerScheme, AnswerSymbol, DatasetKind};
use serde::Deserialize;

/// HuggingFace dataset identifier.
const PUBMEDQA_DATASET: &str = "qiaojin/PubMedQA";

/// The expert-labeled config.
const PUBMEDQA_CONFIG: &str = "pqa_labeled";

/// pqa_labeled publishes everything under the train split.
const PUBMEDQA_SPLIT: &str = "train";

/// Collector for the PubMedQA benchmark.
pub struct PubMedQaCollector {
    client: HuggingFaceClient,
}

impl PubMedQaCollector {
    /// Create a collector against the public rows API.
    pub fn new() -> Self {
        Self {
            client: HuggingFaceClient::new(),
        }
    }

    /// Create a collector with a preconfigured client.
    pub fn with_client(client: HuggingFaceClient) -> Self {
        Self { client }
    }

    /// Fetch and normalize the split, skipping malformed rows.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::EmptyDataset` if no row survives conversion.
    pub async fn collect(&self, limit: Option<usize>) -> DatasetResult<Vec<QuestionRow>> {
        let entries: Vec<RowEntry<PubMedQaRow>> = self
            .client
            .fetch_split(PUBMEDQA_DATASET, PUBMEDQA_CONFIG, PUBMEDQA_SPLIT, limit)
            .await?;

        let mut questions = Vec::with_capacity(entries.len());
        let mut skipped = 0usize;
        for entry in entries {
            match convert_row(entry) {
                Some(question) => questions.push(question),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                dataset = %DatasetKind::PubMedQa,
                skipped = skipped,
                "Skipped malformed rows"
            );
        }
        if questions.is_empty() {
            return Err(DatasetError::EmptyDataset {
                dataset: DatasetKind::PubMedQa.to_string(),
            });
        }

        Ok(questions)
    }
}

impl Default for PubMedQaCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an upstream row into a normalized question.
///
/// The abstract sections are joined with single spaces. Truncation for
/// prompt budgets happens later, at render time.
fn convert_row(entry: RowEntry<PubMedQaRow>) -> Option<QuestionRow> {
    let idx = entry.row_idx;
    let data = entry.row;

    let question = data.question.filter(|q| !q.trim().is_empty())?;
    let contexts = data.context?.contexts?;
    if contexts.is_empty() {
        return None;
    }
    let ground_truth = data
        .final_decision
        .and_then(|d| AnswerSymbol::parse(&d, AnswerScheme::YesNoMaybe))?;

    Some(QuestionRow {
        id: u32::try_from(idx).ok()?,
        dataset: DatasetKind::PubMedQa,
        question,
        payload: QuestionPayload::Context {
            text: contexts.join(" "),
        },
        ground_truth,
    })
}

/// Data fields for a PubMedQA row.
#[derive(Debug, Deserialize)]
struct PubMedQaRow {
    /// Research question.
    question: Option<String>,
    /// Structured abstract sections.
    context: Option<PubMedContext>,
    /// Gold answer: yes, no, or maybe.
    final_decision: Option<String>,
}

/// Abstract container as served upstream.
#[derive(Debug, Deserialize)]
struct PubMedContext {
    /// Section texts in publication order.
    contexts: Option<Vec<String>>,
}
