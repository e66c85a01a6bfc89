//! Order-independent aggregation of scored questions into summary rows.
//!
//! Every statistic is accumulated in integer counters and divided once at
//! the end, so a summary is bit-identical under any permutation of its
//! input. Floating point only appears in the final division.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AggregateError;
use crate::scoring::ScoredQuestion;
use crate::types::{DatasetKind, PromptStyle};

pub type AggregateResult<T> = Result<T, AggregateError>;

/// How to group scored questions before summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One row per model.
    Model,
    /// One row per dataset.
    Dataset,
    /// One row per model and dataset pair: the master summary layout.
    ModelDataset,
    /// One row per model, dataset and prompt style, each style scored
    /// from its own single extraction.
    ModelDatasetStyle,
}

/// Aggregate metrics for one group. Rebuilt from scratch on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub model: Option<String>,
    pub dataset: Option<DatasetKind>,
    pub style: Option<PromptStyle>,
    pub n_questions: usize,
    pub mean_consistency: f64,
    /// Sample standard deviation of the consistency scores; 0.0 for a
    /// single-member group.
    pub std_consistency: f64,
    /// Fraction of questions whose leading answer matched the ground
    /// truth. Questions with no valid extraction at all count against the
    /// denominator.
    pub accuracy: f64,
    /// Fraction of individual extractions that were unresolved.
    pub unknown_rate: f64,
    /// Number of questions with consistency exactly 1.0.
    pub fully_consistent: usize,
    pub fully_consistent_fraction: f64,
    /// Per-style accuracy in canonical style order; absent on style-level
    /// rows where it would repeat the row's own accuracy.
    pub style_accuracy: Option<[f64; 5]>,
}

/// Group scored questions and summarize each group.
///
/// Output rows are sorted by (model, dataset, style). Styles within a
/// model and dataset are reported in canonical style order.
///
/// # Errors
///
/// Returns `AggregateError::EmptyInput` when `scored` is empty; a mean
/// over zero questions is undefined and is never silently defaulted.
pub fn aggregate(scored: &[ScoredQuestion], grouping: Grouping) -> AggregateResult<Vec<SummaryRow>> {
    if scored.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    match grouping {
        Grouping::ModelDatasetStyle => aggregate_styles(scored),
        _ => aggregate_questions(scored, grouping),
    }
}

fn aggregate_questions(
    scored: &[ScoredQuestion],
    grouping: Grouping,
) -> AggregateResult<Vec<SummaryRow>> {
    let mut groups: BTreeMap<(Option<String>, Option<DatasetKind>), Vec<&ScoredQuestion>> =
        BTreeMap::new();
    for question in scored {
        let key = match grouping {
            Grouping::Model => (Some(question.model.clone()), None),
            Grouping::Dataset => (None, Some(question.dataset)),
            _ => (Some(question.model.clone()), Some(question.dataset)),
        };
        groups.entry(key).or_default().push(question);
    }

    let rows = groups
        .into_iter()
        .map(|((model, dataset), members)| summarize_questions(model, dataset, &members))
        .collect();
    Ok(rows)
}

/// Summarize one group of full five-way scored questions.
fn summarize_questions(
    model: Option<String>,
    dataset: Option<DatasetKind>,
    members: &[&ScoredQuestion],
) -> SummaryRow {
    let n = members.len();
    let mut tally_sum: u64 = 0;
    let mut tally_sq_sum: u64 = 0;
    let mut correct: usize = 0;
    let mut unresolved: usize = 0;
    let mut fully: usize = 0;
    let mut style_correct = [0usize; 5];

    for question in members {
        // consistency was computed as k/5, so this recovers k exactly.
        let tally = (question.consistency * 5.0).round() as u64;
        tally_sum += tally;
        tally_sq_sum += tally * tally;
        if question.is_correct == Some(true) {
            correct += 1;
        }
        unresolved += question.unknown_count();
        if tally == 5 {
            fully += 1;
        }
        for style in PromptStyle::ALL {
            if question.style_correct(style) {
                style_correct[style.index()] += 1;
            }
        }
    }

    let style_accuracy = style_correct.map(|c| c as f64 / n as f64);

    SummaryRow {
        model,
        dataset,
        style: None,
        n_questions: n,
        mean_consistency: tally_sum as f64 / (5 * n as u64) as f64,
        std_consistency: sample_std(n, 5, tally_sum, tally_sq_sum),
        accuracy: correct as f64 / n as f64,
        unknown_rate: unresolved as f64 / (5 * n) as f64,
        fully_consistent: fully,
        fully_consistent_fraction: fully as f64 / n as f64,
        style_accuracy: Some(style_accuracy),
    }
}

/// One row per model, dataset and style, treating each style's extraction
/// as a single-answer pseudo-record: consistency 1.0 when the extraction
/// resolved, 0.0 when it did not.
fn aggregate_styles(scored: &[ScoredQuestion]) -> AggregateResult<Vec<SummaryRow>> {
    let mut groups: BTreeMap<(String, DatasetKind), Vec<&ScoredQuestion>> = BTreeMap::new();
    for question in scored {
        groups
            .entry((question.model.clone(), question.dataset))
            .or_default()
            .push(question);
    }

    let mut rows = Vec::with_capacity(groups.len() * PromptStyle::ALL.len());
    for ((model, dataset), members) in groups {
        let n = members.len();
        for style in PromptStyle::ALL {
            let resolved = members
                .iter()
                .filter(|q| !q.style_answer(style).is_unresolved())
                .count();
            let correct = members.iter().filter(|q| q.style_correct(style)).count();

            rows.push(SummaryRow {
                model: Some(model.clone()),
                dataset: Some(dataset),
                style: Some(style),
                n_questions: n,
                mean_consistency: resolved as f64 / n as f64,
                std_consistency: sample_std(n, 1, resolved as u64, resolved as u64),
                accuracy: correct as f64 / n as f64,
                unknown_rate: (n - resolved) as f64 / n as f64,
                fully_consistent: resolved,
                fully_consistent_fraction: resolved as f64 / n as f64,
                style_accuracy: None,
            });
        }
    }
    Ok(rows)
}

/// Sample standard deviation of per-question values `k_i / weight`,
/// computed from the integer sums so that the result does not depend on
/// accumulation order. Defined as 0.0 when fewer than two members.
fn sample_std(n: usize, weight: u64, sum: u64, sq_sum: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let n_u = n as u64;
    // n*Σk² − (Σk)² is non-negative by Cauchy-Schwarz.
    let numerator = (n_u * sq_sum - sum * sum) as f64;
    let denominator = (weight * weight * n_u * (n_u - 1)) as f64;
    (numerator / denominator).sqrt()
}
