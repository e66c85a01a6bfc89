//! Prompt set rendering and persistence.
//!
//! Takes a sampled question and renders all five style templates for it.
//! The rendered sets are persisted to `data/prompts/` so that inference can
//! run without re-fetching anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::templates;
use crate::datasets::{QuestionPayload, QuestionRow, QuestionSample};
use crate::error::PromptError;
use crate::types::{AnswerSymbol, DatasetKind, PromptStyle};

/// Context passed to PubMedQA templates is capped at this many characters.
/// Keeps prompts inside small-model context windows.
pub const CONTEXT_CHAR_LIMIT: usize = 1000;

/// All five rendered prompts for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    /// Question id, carried from the sampled row.
    pub id: u32,

    /// Question text, for human inspection of the artifacts.
    pub question: String,

    /// Gold answer, carried through to the raw results.
    pub ground_truth: AnswerSymbol,

    /// Rendered prompt per style, keyed in canonical style order.
    pub prompts: BTreeMap<PromptStyle, String>,
}

/// A dataset's rendered prompt sets, as persisted to `data/prompts/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptFile {
    /// Which benchmark the prompts were built from.
    pub dataset: DatasetKind,

    /// When the prompts were rendered.
    pub generated_at: DateTime<Utc>,

    /// One set per sampled question, in sample order.
    pub sets: Vec<PromptSet>,
}

impl PromptFile {
    /// File name of the persisted prompt sets for a dataset.
    pub fn file_name(dataset: DatasetKind) -> String {
        format!("{}_prompts.json", dataset)
    }

    /// Write the prompt sets as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PromptError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read previously persisted prompt sets.
    pub fn load(path: &Path) -> Result<Self, PromptError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Render all five styles for every question in a sample.
pub fn build_prompt_file(sample: &QuestionSample) -> Result<PromptFile, PromptError> {
    let mut sets = Vec::with_capacity(sample.questions.len());
    for row in &sample.questions {
        sets.push(render_prompt_set(row)?);
    }
    Ok(PromptFile {
        dataset: sample.dataset,
        generated_at: Utc::now(),
        sets,
    })
}

/// Render all five style prompts for one question.
pub fn render_prompt_set(row: &QuestionRow) -> Result<PromptSet, PromptError> {
    let context = build_context(row);

    let mut prompts = BTreeMap::new();
    for style in PromptStyle::ALL {
        let source = templates::template(row.dataset, style);
        let rendered =
            tera::Tera::one_off(source, &context, false).map_err(|e| PromptError::RenderFailed {
                style,
                message: e.to_string(),
            })?;
        prompts.insert(style, rendered);
    }

    Ok(PromptSet {
        id: row.id,
        question: row.question.clone(),
        ground_truth: row.ground_truth,
        prompts,
    })
}

/// Template variables for one question.
fn build_context(row: &QuestionRow) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("question", &row.question);

    match &row.payload {
        QuestionPayload::Options { a, b, c, d } => {
            context.insert("options", &format!("A: {a}\nB: {b}\nC: {c}\nD: {d}"));
            context.insert("option_a", a);
            context.insert("option_b", b);
            context.insert("option_c", c);
            context.insert("option_d", d);
        }
        QuestionPayload::Context { text } => {
            context.insert("context", truncate_chars(text, CONTEXT_CHAR_LIMIT));
        }
    }

    context
}

/// First `limit` characters of `text`, cut on a character boundary.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_row() -> QuestionRow {
        QuestionRow {
            id: 4,
            dataset: DatasetKind::MedQa,
            question: "Which vitamin deficiency causes scurvy?".to_string(),
            payload: QuestionPayload::Options {
                a: "Vitamin A".to_string(),
                b: "Vitamin B12".to_string(),
                c: "Vitamin C".to_string(),
                d: "Vitamin D".to_string(),
            },
            ground_truth: AnswerSymbol::C,
        }
    }

    fn pubmedqa_row(context: &str) -> QuestionRow {
        QuestionRow {
            id: 9,
            dataset: DatasetKind::PubMedQa,
            question: "Does the intervention help?".to_string(),
            payload: QuestionPayload::Context {
                text: context.to_string(),
            },
            ground_truth: AnswerSymbol::Maybe,
        }
    }

    #[test]
    fn test_original_style_renders_exactly() {
        let set = render_prompt_set(&mcq_row()).expect("render should succeed");
        let expected = "Answer the following medical question by choosing the correct option.\n\n\
                        Question: Which vitamin deficiency causes scurvy?\n\n\
                        Options:\n\
                        A: Vitamin A\nB: Vitamin B12\nC: Vitamin C\nD: Vitamin D\n\n\
                        Answer with only the option letter (A, B, C, or D).";
        assert_eq!(set.prompts[&PromptStyle::Original], expected);
    }

    #[test]
    fn test_direct_style_lists_options_individually() {
        let set = render_prompt_set(&mcq_row()).expect("render should succeed");
        let direct = &set.prompts[&PromptStyle::Direct];
        assert!(direct.contains("Option A: Vitamin A\n"));
        assert!(direct.contains("Option D: Vitamin D\n\n"));
        assert!(direct.ends_with("State only the letter."));
    }

    #[test]
    fn test_pubmedqa_direct_style_renders_exactly() {
        let set = render_prompt_set(&pubmedqa_row("Short context.")).expect("render");
        assert_eq!(
            set.prompts[&PromptStyle::Direct],
            "Context: Short context.\n\nQ: Does the intervention help?\nA (yes/no/maybe):"
        );
    }

    #[test]
    fn test_all_five_styles_render_and_differ() {
        let set = render_prompt_set(&mcq_row()).expect("render should succeed");
        assert_eq!(set.prompts.len(), 5);
        let texts: Vec<&String> = set.prompts.values().collect();
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_long_context_is_truncated_to_limit() {
        let long = "x".repeat(CONTEXT_CHAR_LIMIT + 500);
        let set = render_prompt_set(&pubmedqa_row(&long)).expect("render should succeed");
        let original = &set.prompts[&PromptStyle::Original];
        assert!(original.contains(&"x".repeat(CONTEXT_CHAR_LIMIT)));
        assert!(!original.contains(&"x".repeat(CONTEXT_CHAR_LIMIT + 1)));
    }

    #[test]
    fn test_truncation_respects_multibyte_boundaries() {
        // Two-byte characters around the cut point must not split.
        let long = "é".repeat(CONTEXT_CHAR_LIMIT + 10);
        assert_eq!(truncate_chars(&long, CONTEXT_CHAR_LIMIT).chars().count(), CONTEXT_CHAR_LIMIT);
        assert_eq!(truncate_chars("short", CONTEXT_CHAR_LIMIT), "short");
    }

    #[test]
    fn test_prompt_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(PromptFile::file_name(DatasetKind::MedQa));

        let file = PromptFile {
            dataset: DatasetKind::MedQa,
            generated_at: Utc::now(),
            sets: vec![render_prompt_set(&mcq_row()).expect("render")],
        };
        file.save(&path).expect("save should succeed");

        let loaded = PromptFile::load(&path).expect("load should succeed");
        assert_eq!(loaded.dataset, DatasetKind::MedQa);
        assert_eq!(loaded.sets.len(), 1);
        assert_eq!(loaded.sets[0].id, 4);
        assert_eq!(loaded.sets[0].ground_truth, AnswerSymbol::C);
        assert_eq!(loaded.sets[0].prompts.len(), 5);
    }
}
