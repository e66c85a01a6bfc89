//! CSV report tables for scored runs, summaries, and significance tests.

pub mod tables;

pub use tables::{
    scored_table, scored_table_name, significance_table, summary_table, write_table,
    QUESTION_PREVIEW_CHARS, SIGNIFICANCE_FILE_NAME, SUMMARY_FILE_NAME,
};
