//! MedMCQA collector.
//!
//! MedMCQA serves four-option questions from Indian medical entrance exams
//! (AIIMS and NEET PG). Options arrive in the flat `opa` to `opd` columns
//! and the gold answer as the integer `cop`, 0 through 3.

use super::huggingface::{HuggingFaceClient, RowEntry};
use super::types::{DatasetResult, QuestionPayload, QuestionRow};
use crate::error::DatasetError;
use crate::types::{AnswerScheme, AnswerSymbol, DatasetKind};
use serde::Deserialize;

/// HuggingFace dataset identifier.
const MEDMCQA_DATASET: &str = "medmcqa";

/// Dataset config on the rows API.
const MEDMCQA_CONFIG: &str = "default";

/// The validation split carries the public gold answers.
const MEDMCQA_SPLIT: &str = "validation";

/// Collector for the MedMCQA benchmark.
pub struct MedMcqaCollector {
    client: HuggingFaceClient,
}

impl MedMcqaCollector {
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
    /// Rows with a `cop` outside 0..=3 are dropped rather than coerced to a
    /// default answer.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::EmptyDataset` if no row survives conversion.
    pub async fn collect(&self, limit: Option<usize>) -> DatasetResult<Vec<QuestionRow>> {
        let entries: Vec<RowEntry<MedMcqaRow>> = self
            .client
            .fetch_split(MEDMCQA_DATASET, MEDMCQA_CONFIG, MEDMCQA_SPLIT, limit)
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
                dataset = %DatasetKind::MedMcqa,
                skipped = skipped,
                "Skipped malformed rows"
            );
        }
        if questions.is_empty() {
            return Err(DatasetError::EmptyDataset {
                dataset: DatasetKind::MedMcqa.to_string(),
            });
        }

        Ok(questions)
    }
}

impl Default for MedMcqaCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an upstream row into a normalized question.
fn convert_row(entry: RowEntry<MedMcqaRow>) -> Option<QuestionRow> {
    let idx = entry.row_idx;
    let data = entry.row;

    let question = data.question.filter(|q| !q.trim().is_empty())?;
    let ground_truth = data
        .cop
        .and_then(|cop| usize::try_from(cop).ok())
        .and_then(|cop| AnswerScheme::MultipleChoice.symbols().get(cop).copied())?;

    Some(QuestionRow {
        id: u32::try_from(idx).ok()?,
        dataset: DatasetKind::MedMcqa,
        question,
        payload: QuestionPayload::Options {
            a: data.opa?,
            b: data.opb?,
            c: data.opc?,
            d: data.opd?,
        },
        ground_truth,
    })
}

/// Data fields for a MedMCQA row.
#[derive(Debug, Deserialize)]
struct MedMcqaRow {
    /// Question stem.
    question: Option<String>,
    /// Option A text.
    opa: Option<String>,
    /// Option B text.
    opb: Option<String>,
    /// Option C text.
    opc: Option<String>,
    /// Option D text.
    opd: Option<String>,
    /// Index of the correct option, 0 through 3.
    cop: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(idx: usize, cop: i64) -> RowEntry<MedMcqaRow> {
        RowEntry {
            row_idx: idx,
            row: MedMcqaRow {
                question: Some("Which nerve innervates the deltoid?".to_string()),
                opa: Some("Axillary".to_string()),
                opb: Some("Radial".to_string()),
                opc: Some("Median".to_string()),
                opd: Some("Ulnar".to_string()),
                cop: Some(cop),
            },
        }
    }

    #[test]
    fn test_cop_index_maps_to_letter() {
        assert_eq!(
            convert_row(full_row(0, 0)).unwrap().ground_truth,
            AnswerSymbol::A
        );
        assert_eq!(
            convert_row(full_row(1, 2)).unwrap().ground_truth,
            AnswerSymbol::C
        );
        assert_eq!(
            convert_row(full_row(2, 3)).unwrap().ground_truth,
            AnswerSymbol::D
        );
    }

    #[test]
    fn test_out_of_range_cop_is_dropped() {
        assert!(convert_row(full_row(0, 4)).is_none());
        assert!(convert_row(full_row(0, -1)).is_none());
    }

    #[test]
    fn test_missing_option_is_dropped() {
        let mut entry = full_row(0, 1);
        entry.row.opd = None;
        assert!(convert_row(entry).is_none());
    }
}
