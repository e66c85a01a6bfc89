//! Shared vocabulary for the significance layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StatsError;
use crate::types::DatasetKind;

pub type StatsResult<T> = Result<T, StatsError>;

/// Model pairs compared by default, challenger listed first. These are the
/// comparisons the study reports.
pub const DEFAULT_PAIRS: [(&str, &str); 4] = [
    ("llama3.2", "phi3_mini"),
    ("gemma2", "phi3_mini"),
    ("mistral", "phi3_mini"),
    ("llama3.2", "gemma2"),
];

/// Statistic and two-sided p-value of one test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

/// Which per-question measurement a test compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMetric {
    /// Per-question consistency scores, compared with Wilcoxon
    /// signed-rank.
    Consistency,
    /// Per-question correctness, compared with McNemar.
    Accuracy,
}

impl TestMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestMetric::Consistency => "consistency",
            TestMetric::Accuracy => "accuracy",
        }
    }
}

impl fmt::Display for TestMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One significance test between two models on one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub dataset: DatasetKind,
    pub model_a: String,
    pub model_b: String,
    pub metric: TestMetric,
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    /// Conventional significance mark for the p-value.
    pub fn significance(&self) -> &'static str {
        significance_mark(self.p_value)
    }
}

/// Both tests between one pair of models on one dataset.
#[derive(Debug, Clone)]
pub struct ModelComparison {
    pub consistency: TestResult,
    pub accuracy: TestResult,
}

/// Star notation: *** p<0.001, ** p<0.01, * p<0.05, ns otherwise.
pub fn significance_mark(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        "ns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_marks() {
        assert_eq!(significance_mark(0.0005), "***");
        assert_eq!(significance_mark(0.005), "**");
        assert_eq!(significance_mark(0.03), "*");
        assert_eq!(significance_mark(0.2), "ns");
        // Thresholds are strict.
        assert_eq!(significance_mark(0.05), "ns");
        assert_eq!(significance_mark(0.01), "*");
        assert_eq!(significance_mark(0.001), "**");
    }

    #[test]
    fn test_default_pairs_reference_phi3() {
        assert_eq!(DEFAULT_PAIRS.len(), 4);
        assert!(DEFAULT_PAIRS.iter().filter(|(_, b)| *b == "phi3_mini").count() >= 3);
    }
}
