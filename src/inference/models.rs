//! Model registry for the benchmark.
//!
//! Models are addressed by a short key that names files and CSV rows, and a
//! backend tag that names the model on the Ollama server. The four defaults
//! are the small instruction-tuned models the benchmark compares.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Default model keys and their backend tags.
const DEFAULT_MODELS: [(&str, &str); 4] = [
    ("phi3_mini", "phi3:mini"),
    ("llama3.2", "llama3.2:3b"),
    ("gemma2", "gemma2:2b"),
    ("mistral", "mistral:7b"),
];

/// A model under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Short key used in file names and report rows.
    pub key: String,
    /// Tag the backend resolves, e.g. `phi3:mini`.
    pub name: String,
}

impl ModelSpec {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// The default model roster, in comparison order.
pub fn default_models() -> Vec<ModelSpec> {
    DEFAULT_MODELS
        .iter()
        .map(|(key, name)| ModelSpec::new(*key, *name))
        .collect()
}

/// Resolve a model argument to a spec.
///
/// Accepts either a known key (`phi3_mini`) or an explicit `key=tag` pair
/// (`my_model=llama3:8b`) for models outside the default roster.
///
/// # Errors
///
/// Returns `LlmError::UnknownModel` for a bare key that is not in the
/// default roster.
pub fn resolve_model(arg: &str) -> Result<ModelSpec, LlmError> {
    if let Some((key, name)) = arg.split_once('=') {
        let key = key.trim();
        let name = name.trim();
        if key.is_empty() || name.is_empty() {
            return Err(LlmError::UnknownModel(arg.to_string()));
        }
        return Ok(ModelSpec::new(key, name));
    }

    let key = arg.trim();
    DEFAULT_MODELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(k, n)| ModelSpec::new(*k, *n))
        .ok_or_else(|| LlmError::UnknownModel(arg.to_string()))
}
