//! Paired significance tests over scored output.
//!
//! Consistency differences between models go through the Wilcoxon
//! signed-rank test, correctness differences through McNemar's test. Both
//! are implemented here directly; the sample sizes involved put them well
//! inside the normal-approximation regime.

pub mod compare;
mod distributions;
pub mod mcnemar;
pub mod types;
pub mod wilcoxon;

pub use compare::compare_models;
pub use mcnemar::mcnemar;
pub use types::{
    significance_mark, ModelComparison, StatsResult, TestMetric, TestResult, TestStatistic,
    DEFAULT_PAIRS,
};
pub use wilcoxon::wilcoxon_signed_rank;
