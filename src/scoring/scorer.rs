//! Per-question consistency scoring.
//!
//! Turns a validated [`QuestionRecord`] into a [`ScoredQuestion`]: the five
//! raw responses are extracted, tallied, and classified. Everything here is
//! pure computation; a record that constructed successfully cannot fail to
//! score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::extract::extract;
use super::record::{QuestionRecord, RawResponse, RecordResult};
use crate::error::ExportError;
use crate::inference::RawRunFile;
use crate::types::{
    AnswerScheme, AnswerSymbol, DatasetKind, ExtractedAnswer, FailureMode, PromptStyle,
};

/// Scored outcome for one question. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredQuestion {
    pub id: u32,
    pub dataset: DatasetKind,
    pub model: String,
    pub question: String,
    pub scheme: AnswerScheme,
    pub ground_truth: AnswerSymbol,
    /// One extraction per prompt style, in canonical style order.
    pub extracted: [ExtractedAnswer; 5],
    /// Most frequent valid symbol, or `Unresolved` when no symbol uniquely
    /// dominates (tie among valid answers, or nothing valid at all).
    pub majority_answer: ExtractedAnswer,
    /// Agreement magnitude: largest valid tally over five. Always a
    /// multiple of 0.2.
    pub consistency: f64,
    /// Whether the leading answer matches the ground truth. `None` when
    /// every extraction was unresolved.
    pub is_correct: Option<bool>,
    pub failure_mode: FailureMode,
}

impl ScoredQuestion {
    /// Extraction for one style.
    pub fn style_answer(&self, style: PromptStyle) -> ExtractedAnswer {
        self.extracted[style.index()]
    }

    /// Whether the extraction for one style matches the ground truth.
    /// An unresolved extraction is never correct.
    pub fn style_correct(&self, style: PromptStyle) -> bool {
        self.style_answer(style).symbol() == Some(self.ground_truth)
    }

    /// Number of unresolved extractions among the five.
    pub fn unknown_count(&self) -> usize {
        self.extracted.iter().filter(|e| e.is_unresolved()).count()
    }

    /// Fraction of the five extractions that were unresolved.
    pub fn unknown_rate(&self) -> f64 {
        self.unknown_count() as f64 / self.extracted.len() as f64
    }

    pub fn fully_consistent(&self) -> bool {
        self.consistency == 1.0
    }
}

/// Score one record: extract all five responses, find the majority, and
/// classify the failure mode.
///
/// Tie policy: when two or more valid symbols share the highest tally the
/// majority is reported as `Unresolved`, but `consistency` still reflects
/// the largest tied tally, and correctness is judged against the leading
/// symbol picked by the scheme's stable order (A before B before C before
/// D; yes before no before maybe). This keeps every field deterministic
/// under input reordering.
pub fn score(record: &QuestionRecord) -> ScoredQuestion {
    let scheme = record.scheme();

    let mut extracted = [ExtractedAnswer::Unresolved; 5];
    for (slot, response) in extracted.iter_mut().zip(record.responses()) {
        *slot = extract(&response.text, scheme);
    }

    let tally = tally_symbols(&extracted, scheme);
    let leading = leading_symbol(&tally);
    let leading_count = leading.map(|(_, count)| count).unwrap_or(0);
    let tied = tally
        .iter()
        .filter(|(_, count)| *count == leading_count && leading_count > 0)
        .count()
        > 1;

    let majority_answer = match leading {
        Some((symbol, _)) if !tied => ExtractedAnswer::Symbol(symbol),
        _ => ExtractedAnswer::Unresolved,
    };

    let consistency = leading_count as f64 / extracted.len() as f64;
    let unresolved = extracted.iter().filter(|e| e.is_unresolved()).count();

    let is_correct = leading.map(|(symbol, _)| symbol == record.ground_truth());

    let failure_mode = if unresolved == extracted.len() {
        FailureMode::FullUnknown
    } else if unresolved > 0 {
        FailureMode::PartialUnknown
    } else if let ExtractedAnswer::Symbol(majority) = majority_answer {
        if majority == record.ground_truth() {
            FailureMode::None
        } else {
            FailureMode::InconsistentWrong
        }
    } else {
        // Valid symbols tied with no unknowns: no listed failure applies.
        FailureMode::None
    };

    ScoredQuestion {
        id: record.id(),
        dataset: record.dataset(),
        model: record.model().to_string(),
        question: record.question().to_string(),
        scheme,
        ground_truth: record.ground_truth(),
        extracted,
        majority_answer,
        consistency,
        is_correct,
        failure_mode,
    }
}

/// Score every question of a persisted inference run.
///
/// Errored completions enter scoring as empty text and extract to
/// `Unresolved`, so a partially failed run still scores.
///
/// # Errors
///
/// Returns `RecordError` if a result does not carry exactly one response
/// per style or its ground truth is invalid for the run's dataset.
pub fn score_run(run: &RawRunFile) -> RecordResult<Vec<ScoredQuestion>> {
    let mut scored = Vec::with_capacity(run.results.len());
    for result in &run.results {
        let responses = result
            .responses
            .iter()
            .map(|(style, record)| RawResponse::new(*style, record.raw.clone()))
            .collect();
        let record = QuestionRecord::new(
            result.id,
            run.dataset,
            run.model.key.clone(),
            result.question.clone(),
            result.ground_truth,
            responses,
        )?;
        scored.push(score(&record));
    }
    Ok(scored)
}

/// A model-dataset scored set, as persisted to `results/scored/`.
///
/// The CSV table alongside it is for reading; this file is what the
/// significance stage loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFile {
    pub dataset: DatasetKind,
    pub model: String,
    pub scored_at: DateTime<Utc>,
    pub questions: Vec<ScoredQuestion>,
}

impl ScoredFile {
    pub fn new(dataset: DatasetKind, model: impl Into<String>, questions: Vec<ScoredQuestion>) -> Self {
        Self {
            dataset,
            model: model.into(),
            scored_at: Utc::now(),
            questions,
        }
    }

    /// File name of the persisted scored set for a dataset and model key.
    pub fn file_name(dataset: DatasetKind, model_key: &str) -> String {
        format!("{}_{}_scored.json", dataset, model_key)
    }

    /// Write the scored set as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously persisted scored set.
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Count occurrences of each valid symbol, in the scheme's canonical order.
fn tally_symbols(
    extracted: &[ExtractedAnswer; 5],
    scheme: AnswerScheme,
) -> Vec<(AnswerSymbol, usize)> {
    scheme
        .symbols()
        .iter()
        .map(|&symbol| {
            let count = extracted
                .iter()
                .filter(|e| e.symbol() == Some(symbol))
                .count();
            (symbol, count)
        })
        .collect()
}

/// The symbol with the highest tally, ties resolved by canonical order.
/// `None` when nothing valid was extracted.
fn leading_symbol(tally: &[(AnswerSymbol, usize)]) -> Option<(AnswerSymbol, usize)> {
    let mut best: Option<(AnswerSymbol, usize)> = None;
    for &(symbol, count) in tally {
        if count > 0 && best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((symbol, count));
        }
    }
    best
}
