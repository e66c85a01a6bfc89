//! Aggregation of per-question scores into summary tables.

pub mod engine;

pub use engine::{aggregate, AggregateResult, Grouping, SummaryRow};
