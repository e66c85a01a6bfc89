//! Model inference for stylebench.
//!
//! Sends rendered prompts to a local Ollama server and persists the raw
//! completions. Answer extraction deliberately happens later, in scoring,
//! so a change to extraction rules never requires re-running models.

pub mod models;
pub mod ollama;
pub mod runner;

pub use models::{default_models, resolve_model, ModelSpec};
pub use ollama::{CompletionBackend, CompletionRequest, OllamaClient, OLLAMA_BASE_URL};
pub use runner::{
    run_model, RawQuestionResult, RawResponseRecord, RawRunFile, RunConfig,
    DEFAULT_STYLE_DELAY_MS,
};
