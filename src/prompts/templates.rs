//! Prompt templates, five styles per dataset.
//!
//! Each template asks the same clinical question in a different register.
//! All five must request the same answer format so that extraction treats
//! the styles identically. Templates are Tera source; the renderer supplies
//! `question` plus `options`/`option_a`..`option_d` for multiple choice or
//! `context` for PubMedQA.

use crate::types::{DatasetKind, PromptStyle};

const MEDQA_ORIGINAL: &str = r#"Answer the following medical question by choosing the correct option.

Question: {{ question }}

Options:
{{ options }}

Answer with only the option letter (A, B, C, or D)."#;

const MEDQA_FORMAL: &str = r#"You are a medical expert. Based on your clinical knowledge, select the most appropriate answer to the following question.

Clinical Question: {{ question }}

Choices:
{{ options }}

Respond with only the letter of the correct choice (A, B, C, or D)."#;

const MEDQA_SIMPLIFIED: &str = r#"Read this medical question carefully and pick the best answer.

{{ question }}

{{ options }}

Which letter is correct? Reply with just A, B, C, or D."#;

const MEDQA_ROLEPLAY: &str = r#"You are a physician taking a medical licensing exam. Answer this question as you would on the exam.

Q: {{ question }}

{{ options }}

Your answer (A, B, C, or D):"#;

const MEDQA_DIRECT: &str = r#"Medical question: {{ question }}

Option A: {{ option_a }}
Option B: {{ option_b }}
Option C: {{ option_c }}
Option D: {{ option_d }}

What is the correct option? State only the letter."#;

const MEDMCQA_ORIGINAL: &str = r#"Answer the following medical question by choosing the correct option.

Question: {{ question }}

Options:
{{ options }}

Answer with only the option letter (A, B, C, or D)."#;

const MEDMCQA_FORMAL: &str = r#"You are a medical expert. Select the most appropriate answer to the following clinical question.

Question: {{ question }}

Choices:
{{ options }}

Respond with only the letter of the correct choice (A, B, C, or D)."#;

const MEDMCQA_SIMPLIFIED: &str = r#"Read this question and pick the best answer.

{{ question }}

{{ options }}

Which letter is correct? Reply with just A, B, C, or D."#;

const MEDMCQA_ROLEPLAY: &str = r#"You are a doctor taking a medical entrance exam. Answer this question as you would on the exam.

Q: {{ question }}

{{ options }}

Your answer (A, B, C, or D):"#;

const MEDMCQA_DIRECT: &str = r#"Medical question: {{ question }}

Option A: {{ option_a }}
Option B: {{ option_b }}
Option C: {{ option_c }}
Option D: {{ option_d }}

What is the correct option? State only the letter."#;

const PUBMEDQA_ORIGINAL: &str = r#"Based on the following research context, answer the question with yes, no, or maybe.

Context: {{ context }}

Question: {{ question }}

Answer with only: yes, no, or maybe."#;

const PUBMEDQA_FORMAL: &str = r#"You are a biomedical researcher. Based on the provided abstract, determine whether the answer to the question is yes, no, or maybe.

Abstract: {{ context }}

Research Question: {{ question }}

Respond with only: yes, no, or maybe."#;

const PUBMEDQA_SIMPLIFIED: &str = r#"Read the text below and answer the question.

Text: {{ context }}

Question: {{ question }}

Reply with only: yes, no, or maybe."#;

const PUBMEDQA_ROLEPLAY: &str = r#"You are a doctor reviewing a research paper. Based on this excerpt, answer the clinical question.

Excerpt: {{ context }}

Question: {{ question }}

Your answer (yes, no, or maybe):"#;

const PUBMEDQA_DIRECT: &str = r#"Context: {{ context }}

Q: {{ question }}
A (yes/no/maybe):"#;

/// Template source for one dataset and style.
pub fn template(dataset: DatasetKind, style: PromptStyle) -> &'static str {
    match (dataset, style) {
        (DatasetKind::MedQa, PromptStyle::Original) => MEDQA_ORIGINAL,
        (DatasetKind::MedQa, PromptStyle::Formal) => MEDQA_FORMAL,
        (DatasetKind::MedQa, PromptStyle::Simplified) => MEDQA_SIMPLIFIED,
        (DatasetKind::MedQa, PromptStyle::Roleplay) => MEDQA_ROLEPLAY,
        (DatasetKind::MedQa, PromptStyle::Direct) => MEDQA_DIRECT,
        (DatasetKind::MedMcqa, PromptStyle::Original) => MEDMCQA_ORIGINAL,
        (DatasetKind::MedMcqa, PromptStyle::Formal) => MEDMCQA_FORMAL,
        (DatasetKind::MedMcqa, PromptStyle::Simplified) => MEDMCQA_SIMPLIFIED,
        (DatasetKind::MedMcqa, PromptStyle::Roleplay) => MEDMCQA_ROLEPLAY,
        (DatasetKind::MedMcqa, PromptStyle::Direct) => MEDMCQA_DIRECT,
        (DatasetKind::PubMedQa, PromptStyle::Original) => PUBMEDQA_ORIGINAL,
        (DatasetKind::PubMedQa, PromptStyle::Formal) => PUBMEDQA_FORMAL,
        (DatasetKind::PubMedQa, PromptStyle::Simplified) => PUBMEDQA_SIMPLIFIED,
        (DatasetKind::PubMedQa, PromptStyle::Roleplay) => PUBMEDQA_ROLEPLAY,
        (DatasetKind::PubMedQa, PromptStyle::Direct) => PUBMEDQA_DIRECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dataset_style_pair_has_a_template() {
        for dataset in DatasetKind::ALL {
            for style in PromptStyle::ALL {
                let source = template(dataset, style);
                assert!(!source.is_empty());
                assert!(source.contains("{{ question }}"));
            }
        }
    }

    #[test]
    fn test_mcq_templates_request_a_letter() {
        for dataset in [DatasetKind::MedQa, DatasetKind::MedMcqa] {
            for style in PromptStyle::ALL {
                let source = template(dataset, style);
                assert!(
                    source.contains("A, B, C, or D") || source.contains("just A, B, C, or D"),
                    "{dataset}/{style} must request a bare letter"
                );
            }
        }
    }

    #[test]
    fn test_pubmedqa_templates_request_ternary_answer() {
        for style in PromptStyle::ALL {
            let source = template(DatasetKind::PubMedQa, style);
            assert!(source.contains("{{ context }}"));
            assert!(
                source.contains("yes, no, or maybe") || source.contains("yes/no/maybe"),
                "pubmedqa/{style} must request yes, no, or maybe"
            );
        }
    }

    #[test]
    fn test_styles_are_distinct_within_each_dataset() {
        for dataset in DatasetKind::ALL {
            for (i, a) in PromptStyle::ALL.iter().enumerate() {
                for b in &PromptStyle::ALL[i + 1..] {
                    assert_ne!(
                        template(dataset, *a),
                        template(dataset, *b),
                        "{dataset}: styles {a} and {b} share a template"
                    );
                }
            }
        }
    }

    #[test]
    fn test_exam_registers_differ_between_mcq_datasets() {
        assert!(template(DatasetKind::MedQa, PromptStyle::Roleplay).contains("licensing exam"));
        assert!(template(DatasetKind::MedMcqa, PromptStyle::Roleplay).contains("entrance exam"));
    }
}
