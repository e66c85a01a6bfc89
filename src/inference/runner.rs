//! Inference runner.
//!
//! Drives one model over one dataset's prompt sets: all five styles per
//! question, sequentially within a question and with a bounded number of
//! questions in flight. Backend failures are recorded per style rather than
//! aborting the run, so a flaky server costs single answers, not hours of
//! completed work.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

use super::models::ModelSpec;
use super::ollama::{CompletionBackend, CompletionRequest};
use crate::error::LlmError;
use crate::prompts::{PromptFile, PromptSet};
use crate::types::{AnswerSymbol, DatasetKind, PromptStyle};

/// Pause between style completions within a question, in milliseconds.
/// Keeps a small local server responsive.
pub const DEFAULT_STYLE_DELAY_MS: u64 = 100;

/// Settings for one inference run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Questions answered concurrently. Local single-GPU servers serialize
    /// generations anyway, so the default keeps one in flight.
    pub concurrency: usize,
    /// Delay after each style completion in milliseconds.
    pub style_delay_ms: u64,
    /// Cap on the number of questions; `None` runs the whole prompt file.
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            style_delay_ms: DEFAULT_STYLE_DELAY_MS,
            limit: None,
        }
    }
}

/// One style's completion, as persisted to `results/raw/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResponseRecord {
    /// Trimmed completion text. Empty when the call failed.
    pub raw: String,
    /// Error message when the call failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// All five completions for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestionResult {
    /// Question id, carried from the prompt set.
    pub id: u32,
    /// Question text, for human inspection of the artifacts.
    pub question: String,
    /// Gold answer, carried through to scoring.
    pub ground_truth: AnswerSymbol,
    /// Completion per style, keyed in canonical style order.
    pub responses: BTreeMap<PromptStyle, RawResponseRecord>,
}

impl RawQuestionResult {
    /// Number of styles whose completion failed.
    pub fn error_count(&self) -> usize {
        self.responses.values().filter(|r| r.error.is_some()).count()
    }
}

/// One model-dataset run, as persisted to `results/raw/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRunFile {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Dataset the prompts were built from.
    pub dataset: DatasetKind,
    /// Model that produced the completions.
    pub model: ModelSpec,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Number of questions answered.
    pub question_count: usize,
    /// Number of style completions that failed.
    pub error_count: usize,
    /// Per-question results, in prompt-file order.
    pub results: Vec<RawQuestionResult>,
}

impl RawRunFile {
    /// File name of the persisted run for a dataset and model key.
    pub fn file_name(dataset: DatasetKind, model_key: &str) -> String {
        format!("{}_{}.json", dataset, model_key)
    }

    /// Write the run as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), LlmError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously persisted run.
    pub fn load(path: &Path) -> Result<Self, LlmError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Run one model over one dataset's prompt sets.
pub async fn run_model(
    backend: &dyn CompletionBackend,
    model: &ModelSpec,
    prompts: &PromptFile,
    config: &RunConfig,
) -> RawRunFile {
    let started_at = Utc::now();

    let sets: &[PromptSet] = match config.limit {
        Some(limit) => &prompts.sets[..limit.min(prompts.sets.len())],
        None => &prompts.sets,
    };

    tracing::info!(
        dataset = %prompts.dataset,
        model = %model.key,
        questions = sets.len(),
        "Starting inference run"
    );

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut futures = Vec::with_capacity(sets.len());
    for set in sets {
        let sem = semaphore.clone();
        futures.push(async move {
            let _permit = sem.acquire().await.unwrap();
            run_question(backend, model, set, config.style_delay_ms).await
        });
    }
    let results = join_all(futures).await;

    let error_count = results.iter().map(RawQuestionResult::error_count).sum();
    let finished_at = Utc::now();
    tracing::info!(
        dataset = %prompts.dataset,
        model = %model.key,
        questions = results.len(),
        errors = error_count,
        "Inference run finished"
    );

    RawRunFile {
        run_id: Uuid::new_v4(),
        dataset: prompts.dataset,
        model: model.clone(),
        started_at,
        finished_at,
        question_count: results.len(),
        error_count,
        results,
    }
}

/// Answer all five styles for one question, in canonical style order.
async fn run_question(
    backend: &dyn CompletionBackend,
    model: &ModelSpec,
    set: &PromptSet,
    style_delay_ms: u64,
) -> RawQuestionResult {
    let mut responses = BTreeMap::new();

    for (style, prompt) in &set.prompts {
        let request = CompletionRequest::new(model.name.clone(), prompt.clone());
        let record = match backend.complete(request).await {
            Ok(raw) => RawResponseRecord { raw, error: None },
            Err(err) => {
                tracing::warn!(
                    question = set.id,
                    style = %style,
                    error = %err,
                    "Completion failed"
                );
                RawResponseRecord {
                    raw: String::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        responses.insert(*style, record);

        if style_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(style_delay_ms)).await;
        }
    }

    RawQuestionResult {
        id: set.id,
        question: set.question.clone(),
        ground_truth: set.ground_truth,
        responses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Backend that answers from the prompt text itself.
    struct ScriptedBackend {
        /// Styles whose calls should fail, by marker substring.
        fail_on: Vec<&'static str>,
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
            for marker in &self.fail_on {
                if request.prompt.contains(marker) {
                    return Err(LlmError::RequestFailed("connection reset".to_string()));
                }
            }
            Ok(format!("Answer: A ({})", request.model))
        }
    }

    fn prompt_set(id: u32) -> PromptSet {
        let mut prompts = BTreeMap::new();
        for style in PromptStyle::ALL {
            prompts.insert(style, format!("prompt {id} in style {style}"));
        }
        PromptSet {
            id,
            question: format!("Question {id}?"),
            ground_truth: AnswerSymbol::A,
            prompts,
        }
    }

    fn prompt_file(count: u32) -> PromptFile {
        PromptFile {
            dataset: DatasetKind::MedQa,
            generated_at: Utc::now(),
            sets: (0..count).map(prompt_set).collect(),
        }
    }

    fn fast_config() -> RunConfig {
        RunConfig {
            concurrency: 2,
            style_delay_ms: 0,
            limit: None,
        }
    }

    #[tokio::test]
    async fn test_run_answers_every_style() {
        let backend = ScriptedBackend { fail_on: vec![] };
        let model = ModelSpec::new("phi3_mini", "phi3:mini");
        let run = run_model(&backend, &model, &prompt_file(3), &fast_config()).await;

        assert_eq!(run.question_count, 3);
        assert_eq!(run.error_count, 0);
        assert_eq!(run.dataset, DatasetKind::MedQa);
        for result in &run.results {
            assert_eq!(result.responses.len(), 5);
            for record in result.responses.values() {
                assert!(record.raw.contains("phi3:mini"));
                assert!(record.error.is_none());
            }
        }
        // join_all keeps prompt-file order.
        let ids: Vec<u32> = run.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_backend_failure_is_recorded_not_fatal() {
        let backend = ScriptedBackend {
            fail_on: vec!["prompt 1 in style formal"],
        };
        let model = ModelSpec::new("gemma2", "gemma2:2b");
        let run = run_model(&backend, &model, &prompt_file(2), &fast_config()).await;

        assert_eq!(run.question_count, 2);
        assert_eq!(run.error_count, 1);

        let failed = &run.results[1].responses[&PromptStyle::Formal];
        assert!(failed.raw.is_empty());
        assert!(failed.error.as_deref().unwrap().contains("connection reset"));

        // The other styles of the same question still completed.
        let ok = &run.results[1].responses[&PromptStyle::Direct];
        assert!(ok.error.is_none());
        assert!(!ok.raw.is_empty());
    }

    #[tokio::test]
    async fn test_limit_caps_questions() {
        let backend = ScriptedBackend { fail_on: vec![] };
        let model = ModelSpec::new("mistral", "mistral:7b");
        let config = RunConfig {
            limit: Some(2),
            ..fast_config()
        };
        let run = run_model(&backend, &model, &prompt_file(10), &config).await;
        assert_eq!(run.question_count, 2);
    }

    #[tokio::test]
    async fn test_run_file_round_trip() {
        let backend = ScriptedBackend { fail_on: vec![] };
        let model = ModelSpec::new("phi3_mini", "phi3:mini");
        let run = run_model(&backend, &model, &prompt_file(1), &fast_config()).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir
            .path()
            .join(RawRunFile::file_name(run.dataset, &run.model.key));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "medqa_phi3_mini.json"
        );

        run.save(&path).expect("save should succeed");
        let loaded = RawRunFile::load(&path).expect("load should succeed");
        assert_eq!(loaded.run_id, run.run_id);
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].responses.len(), 5);
    }
}
