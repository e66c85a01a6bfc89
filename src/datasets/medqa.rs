//! MedQA collector.
//!
//! MedQA (USMLE style) serves four-option multiple choice questions from
//! United States medical licensing exams. The gold answer arrives as the
//! option letter in `answer_idx`.

use super::huggingface::{HuggingFaceClient, RowEntry};
use super::types::{DatasetResult, QuestionPayload, QuestionRow};
use crate::error::DatasetError;
use crate::types::{AnswerScheme, AnswerSymbol, DatasetKind};
use serde::Deserialize;

/// HuggingFace dataset identifier.
const MEDQA_DATASET: &str = "GBaker/MedQA-USMLE-4-options";

/// Dataset config on the rows API.
const MEDQA_CONFIG: &str = "default";

/// Split holding the evaluation questions.
const MEDQA_SPLIT: &str = "test";

/// Collector for the MedQA benchmark.
pub struct MedQaCollector {
    client: HuggingFaceClient,
}

impl MedQaCollector {
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
        let entries: Vec<RowEntry<MedQaRow>> = self
            .client
            .fetch_split(MEDQA_DATASET, MEDQA_CONFIG, MEDQA_SPLIT, limit)
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
                dataset = %DatasetKind::MedQa,
                skipped = skipped,
                "Skipped malformed rows"
            );
        }
        if questions.is_empty() {
            return Err(DatasetError::EmptyDataset {
                dataset: DatasetKind::MedQa.to_string(),
            });
        }

        Ok(questions)
    }
}

impl Default for MedQaCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an upstream row into a normalized question.
///
/// Rows missing the question, any option, or a valid answer letter are
/// dropped.
fn convert_row(entry: RowEntry<MedQaRow>) -> Option<QuestionRow> {
    let idx = entry.row_idx;
    let data = entry.row;

    let question = data.question.filter(|q| !q.trim().is_empty())?;
    let options = data.options?;
    let ground_truth = data
        .answer_idx
        .and_then(|idx| AnswerSymbol::parse(&idx, AnswerScheme::MultipleChoice))?;

    Some(QuestionRow {
        id: u32::try_from(idx).ok()?,
        dataset: DatasetKind::MedQa,
        question,
        payload: QuestionPayload::Options {
            a: options.a?,
            b: options.b?,
            c: options.c?,
            d: options.d?,
        },
        ground_truth,
    })
}

/// Data fields for a MedQA row.
#[derive(Debug, Deserialize)]
struct MedQaRow {
    /// Question stem.
    question: Option<String>,
    /// Option texts keyed by letter.
    options: Option<MedQaOptions>,
    /// Gold answer letter.
    answer_idx: Option<String>,
}

/// Option texts as served upstream.
#[derive(Debug, Deserialize)]
struct MedQaOptions {
    #[serde(rename = "A")]
    a: Option<String>,
    #[serde(rename = "B")]
    b: Option<String>,
    #[serde(rename = "C")]
    c: Option<String>,
    #[serde(rename = "D")]
    d: Option<String>,
}
