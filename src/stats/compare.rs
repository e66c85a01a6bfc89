//! Paired comparison of two models' scored output.

use std::collections::BTreeMap;

use super::mcnemar::mcnemar;
use super::types::{ModelComparison, StatsResult, TestMetric, TestResult};
use super::wilcoxon::wilcoxon_signed_rank;
use crate::error::StatsError;
use crate::scoring::ScoredQuestion;
use crate::types::DatasetKind;

/// Run both paired tests between two models on one dataset.
///
/// Questions are paired by id; ids present on only one side are ignored.
/// Consistency scores go through the Wilcoxon signed-rank test,
/// correctness through McNemar. A question with no valid extraction at all
/// counts as incorrect, consistent with how aggregation reports accuracy.
///
/// # Errors
///
/// Returns `StatsError::EmptyPairing` when the two sides share no question
/// ids.
pub fn compare_models(
    dataset: DatasetKind,
    model_a: &str,
    scored_a: &[ScoredQuestion],
    model_b: &str,
    scored_b: &[ScoredQuestion],
) -> StatsResult<ModelComparison> {
    let left: BTreeMap<u32, &ScoredQuestion> = scored_a.iter().map(|q| (q.id, q)).collect();
    let right: BTreeMap<u32, &ScoredQuestion> = scored_b.iter().map(|q| (q.id, q)).collect();

    let mut consistency_pairs = Vec::new();
    let mut accuracy_pairs = Vec::new();
    for (id, a) in &left {
        if let Some(b) = right.get(id) {
            consistency_pairs.push((a.consistency, b.consistency));
            accuracy_pairs.push((a.is_correct == Some(true), b.is_correct == Some(true)));
        }
    }

    if consistency_pairs.is_empty() {
        return Err(StatsError::EmptyPairing {
            left: model_a.to_string(),
            right: model_b.to_string(),
        });
    }

    let wilcoxon = wilcoxon_signed_rank(&consistency_pairs);
    let mcnemar = mcnemar(&accuracy_pairs);

    Ok(ModelComparison {
        consistency: TestResult {
            dataset,
            model_a: model_a.to_string(),
            model_b: model_b.to_string(),
            metric: TestMetric::Consistency,
            statistic: wilcoxon.statistic,
            p_value: wilcoxon.p_value,
        },
        accuracy: TestResult {
            dataset,
            model_a: model_a.to_string(),
            model_b: model_b.to_string(),
            metric: TestMetric::Accuracy,
            statistic: mcnemar.statistic,
            p_value: mcnemar.p_value,
        },
    })
}
