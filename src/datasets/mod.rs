//! Benchmark dataset collectors for stylebench.
//!
//! This module fetches the three clinical QA benchmarks from the HuggingFace
//! rows API, normalizes their rows, and draws the seeded question sample:
//! - MedQA: USMLE-style four-option questions
//! - MedMCQA: Indian medical entrance exam questions
//! - PubMedQA: yes/no/maybe questions over research abstracts

pub mod huggingface;
pub mod medmcqa;
pub mod medqa;
pub mod pubmedqa;
pub mod sample;
pub mod types;

pub use huggingface::{HuggingFaceClient, RowEntry, RowsPage};
pub use medmcqa::MedMcqaCollector;
pub use medqa::MedQaCollector;
pub use pubmedqa::PubMedQaCollector;
pub use sample::{sample_questions, DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE};
pub use types::*;
