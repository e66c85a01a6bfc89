//! The unit of evaluation: one question plus its five styled responses.

use crate::error::RecordError;
use crate::types::{AnswerScheme, AnswerSymbol, DatasetKind, PromptStyle};

pub type RecordResult<T> = Result<T, RecordError>;

/// A single raw model completion for one prompt style.
///
/// Produced by the inference stage and never mutated afterwards. An errored
/// or missing completion is represented by empty text, which later extracts
/// to `Unresolved`.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub style: PromptStyle,
    pub text: String,
}

impl RawResponse {
    pub fn new(style: PromptStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// One question with exactly one response per prompt style.
///
/// Construction validates the shape invariants; a `QuestionRecord` that
/// exists is always scoreable. Responses are held in the canonical style
/// order regardless of the order they were supplied in.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    id: u32,
    dataset: DatasetKind,
    model: String,
    question: String,
    ground_truth: AnswerSymbol,
    responses: Vec<RawResponse>,
}

impl QuestionRecord {
    /// Build a record, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the response count is not five, a style
    /// appears twice, a style is missing, or the ground truth does not
    /// belong to the dataset's answer scheme.
    pub fn new(
        id: u32,
        dataset: DatasetKind,
        model: impl Into<String>,
        question: impl Into<String>,
        ground_truth: AnswerSymbol,
        responses: Vec<RawResponse>,
    ) -> RecordResult<Self> {
        if responses.len() != PromptStyle::ALL.len() {
            return Err(RecordError::WrongResponseCount(responses.len()));
        }

        let mut seen = [false; PromptStyle::ALL.len()];
        for response in &responses {
            let index = response.style.index();
            if seen[index] {
                return Err(RecordError::DuplicateStyle(response.style));
            }
            seen[index] = true;
        }

        let scheme = dataset.scheme();
        if !scheme.contains(ground_truth) {
            return Err(RecordError::GroundTruthOutsideScheme {
                symbol: ground_truth.to_string(),
                scheme: scheme.to_string(),
            });
        }

        let mut ordered = Vec::with_capacity(PromptStyle::ALL.len());
        for style in PromptStyle::ALL {
            let response = responses
                .iter()
                .find(|r| r.style == style)
                .ok_or(RecordError::MissingStyle(style))?;
            ordered.push(response.clone());
        }

        Ok(Self {
            id,
            dataset,
            model: model.into(),
            question: question.into(),
            ground_truth,
            responses: ordered,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn dataset(&self) -> DatasetKind {
        self.dataset
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn scheme(&self) -> AnswerScheme {
        self.dataset.scheme()
    }

    pub fn ground_truth(&self) -> AnswerSymbol {
        self.ground_truth
    }

    /// Responses in canonical style order.
    pub fn responses(&self) -> &[RawResponse] {
        &self.responses
    }
}
