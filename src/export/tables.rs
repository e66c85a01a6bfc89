//! CSV report tables.
//!
//! Three tables mirror the three report layers: the per-question scored
//! table, the master summary across models and datasets, and the pairwise
//! significance table. Tables are built as plain lines and written in one
//! shot; the JSON artifacts next to them stay the machine-readable source
//! of truth, the CSVs are for spreadsheets and quick inspection.

use std::path::Path;

use crate::aggregate::SummaryRow;
use crate::error::ExportError;
use crate::scoring::ScoredQuestion;
use crate::stats::TestResult;
use crate::types::{DatasetKind, PromptStyle};

/// Question text is previewed in the scored table, not reproduced.
pub const QUESTION_PREVIEW_CHARS: usize = 80;

/// File name of the master summary table.
pub const SUMMARY_FILE_NAME: &str = "master_summary.csv";

/// File name of the pairwise significance table.
pub const SIGNIFICANCE_FILE_NAME: &str = "significance_tests.csv";

/// File name of the scored table for a dataset and model key.
pub fn scored_table_name(dataset: DatasetKind, model_key: &str) -> String {
    format!("{}_{}.csv", dataset, model_key)
}

/// Render scored questions as a CSV table, one row per question.
///
/// `is_accurate` is left empty when no extraction resolved at all; an
/// empty cell and a `false` are different findings.
pub fn scored_table(questions: &[ScoredQuestion]) -> String {
    let mut header: Vec<String> = [
        "id",
        "question",
        "correct_answer",
        "majority_answer",
        "is_accurate",
        "consistency_score",
        "unknown_rate",
        "failure_mode",
        "dataset",
        "model",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for style in PromptStyle::ALL {
        header.push(format!("ans_{}", style));
        header.push(format!("correct_{}", style));
    }

    let mut lines = Vec::with_capacity(questions.len() + 1);
    lines.push(header.join(","));

    for question in questions {
        let mut fields = vec![
            question.id.to_string(),
            csv_field(truncate_chars(&question.question, QUESTION_PREVIEW_CHARS)),
            question.ground_truth.to_string(),
            question.majority_answer.label().to_string(),
            question
                .is_correct
                .map(|v| v.to_string())
                .unwrap_or_default(),
            format!("{:.3}", question.consistency),
            format!("{:.3}", question.unknown_rate()),
            question.failure_mode.to_string(),
            question.dataset.to_string(),
            csv_field(&question.model),
        ];
        for style in PromptStyle::ALL {
            fields.push(question.style_answer(style).label().to_string());
            fields.push(question.style_correct(style).to_string());
        }
        lines.push(fields.join(","));
    }

    finish(lines)
}

/// Render summary rows as the master summary table.
///
/// Counts and consistency keep their natural units; accuracy, unknown
/// rate, and the per-style columns are reported as percentages with one
/// decimal. Rows without per-style accuracies leave those cells empty.
pub fn summary_table(rows: &[SummaryRow]) -> String {
    let mut header: Vec<String> = [
        "dataset",
        "model",
        "n_questions",
        "mean_consistency",
        "std_consistency",
        "fully_consistent",
        "fully_consistent_pct",
        "overall_accuracy",
        "unknown_rate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for style in PromptStyle::ALL {
        header.push(format!("acc_{}", style));
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(","));

    for row in rows {
        let mut fields = vec![
            row.dataset.map(|d| d.to_string()).unwrap_or_default(),
            row.model.as_deref().map(csv_field).unwrap_or_default(),
            row.n_questions.to_string(),
            format!("{:.3}", row.mean_consistency),
            format!("{:.3}", row.std_consistency),
            row.fully_consistent.to_string(),
            percent(row.fully_consistent_fraction),
            percent(row.accuracy),
            percent(row.unknown_rate),
        ];
        match row.style_accuracy {
            Some(per_style) => fields.extend(per_style.iter().map(|a| percent(*a))),
            None => fields.extend(PromptStyle::ALL.iter().map(|_| String::new())),
        }
        lines.push(fields.join(","));
    }

    finish(lines)
}

/// Render pairwise test results as the significance table.
pub fn significance_table(results: &[TestResult]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push("dataset,model1,model2,metric,statistic,p_value,significance".to_string());

    for result in results {
        let fields = [
            result.dataset.to_string(),
            csv_field(&result.model_a),
            csv_field(&result.model_b),
            result.metric.to_string(),
            format!("{:.3}", result.statistic),
            format!("{:.4}", result.p_value),
            result.significance().to_string(),
        ];
        lines.push(fields.join(","));
    }

    finish(lines)
}

/// Write a rendered table to `path`, creating parent directories.
pub fn write_table(table: &str, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, table)?;
    Ok(())
}

fn finish(lines: Vec<String>) -> String {
    let mut table = lines.join("\n");
    table.push('\n');
    table
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Prefix of at most `limit` characters, cut on a char boundary.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// A fraction rendered as a percentage with one decimal.
fn percent(fraction: f64) -> String {
    format!("{:.1}", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, Grouping};
    use crate::scoring::{score, QuestionRecord, RawResponse};
    use crate::stats::TestMetric;
    use crate::types::AnswerSymbol;

    fn scored(
        id: u32,
        question: &str,
        ground_truth: AnswerSymbol,
        texts: [&str; 5],
    ) -> ScoredQuestion {
        let responses = PromptStyle::ALL
            .into_iter()
            .zip(texts)
            .map(|(style, text)| RawResponse::new(style, text))
            .collect();
        let record = QuestionRecord::new(
            id,
            DatasetKind::MedQa,
            "phi3_mini",
            question,
            ground_truth,
            responses,
        )
        .unwrap();
        score(&record)
    }

    #[test]
    fn test_scored_table_layout() {
        let table = scored_table(&[scored(
            7,
            "A 63-year-old man presents with chest pain",
            AnswerSymbol::B,
            ["B", "B", "B", "A", "B"],
        )]);
        let mut lines = table.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,question,correct_answer,majority_answer,is_accurate,consistency_score,\
             unknown_rate,failure_mode,dataset,model,\
             ans_original,correct_original,ans_formal,correct_formal,\
             ans_simplified,correct_simplified,ans_roleplay,correct_roleplay,\
             ans_direct,correct_direct"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7,A 63-year-old man presents with chest pain,B,B,true,0.800,0.000,none,\
             medqa,phi3_mini,B,true,B,true,B,true,A,false,B,true"
        );
        assert!(lines.next().is_none());
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn test_question_preview_is_quoted_and_truncated() {
        let long = format!("Fever, cough, and malaise{}", "x".repeat(100));
        let table = scored_table(&[scored(0, &long, AnswerSymbol::A, ["A"; 5])]);
        let row = table.lines().nth(1).unwrap();

        // The preview keeps its commas inside one quoted field.
        assert!(row.starts_with("0,\"Fever, cough, and malaise"));
        let preview: String = long.chars().take(QUESTION_PREVIEW_CHARS).collect();
        assert!(row.contains(&format!("\"{}\"", preview)));
        assert!(!row.contains(&long));
    }

    #[test]
    fn test_quotes_inside_fields_are_doubled() {
        let table = scored_table(&[scored(
            0,
            "What does \"acute\" mean here?",
            AnswerSymbol::A,
            ["A"; 5],
        )]);
        assert!(table.contains("\"What does \"\"acute\"\" mean here?\""));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let question = format!("{}é tail", "q".repeat(QUESTION_PREVIEW_CHARS - 1));
        let table = scored_table(&[scored(0, &question, AnswerSymbol::A, ["A"; 5])]);
        let row = table.lines().nth(1).unwrap();
        // 79 ASCII chars plus the two-byte é is an 80-char preview.
        assert!(row.contains(&format!("{}é,", "q".repeat(QUESTION_PREVIEW_CHARS - 1))));
        assert!(!row.contains("tail"));
    }

    #[test]
    fn test_unanswerable_question_has_empty_accuracy_cell() {
        let table = scored_table(&[scored(3, "q", AnswerSymbol::C, ["", "", "", "", ""])]);
        let row = table.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "3,q,C,UNKNOWN,,0.000,1.000,full_unknown,medqa,phi3_mini,\
             UNKNOWN,false,UNKNOWN,false,UNKNOWN,false,UNKNOWN,false,UNKNOWN,false"
        );
    }

    #[test]
    fn test_summary_table_units() {
        let batch = vec![
            scored(0, "q0", AnswerSymbol::A, ["A", "A", "A", "A", "A"]),
            scored(1, "q1", AnswerSymbol::A, ["B", "B", "B", "B", "A"]),
        ];
        let rows = aggregate(&batch, Grouping::ModelDataset).unwrap();
        let table = summary_table(&rows);
        let mut lines = table.lines();

        assert_eq!(
            lines.next().unwrap(),
            "dataset,model,n_questions,mean_consistency,std_consistency,\
             fully_consistent,fully_consistent_pct,overall_accuracy,unknown_rate,\
             acc_original,acc_formal,acc_simplified,acc_roleplay,acc_direct"
        );
        // Mean consistency (1.0 + 0.8) / 2, one question fully consistent,
        // one correct majority, no unknowns. Per-style accuracy is 50%
        // except the direct style where both answered A.
        let row = lines.next().unwrap();
        assert!(row.starts_with("medqa,phi3_mini,2,0.900,"));
        assert!(row.contains(",1,50.0,50.0,0.0,"));
        assert!(row.ends_with("50.0,50.0,50.0,50.0,100.0"));
    }

    #[test]
    fn test_summary_table_model_only_rows_leave_dataset_empty() {
        let batch = vec![scored(0, "q", AnswerSymbol::A, ["A", "B", "A", "", "A"])];
        let rows = aggregate(&batch, Grouping::Model).unwrap();
        let table = summary_table(&rows);
        let row = table.lines().nth(1).unwrap();
        assert!(row.starts_with(",phi3_mini,1,"));
    }

    #[test]
    fn test_significance_table_rounding() {
        let results = vec![TestResult {
            dataset: DatasetKind::MedMcqa,
            model_a: "llama3.2".to_string(),
            model_b: "phi3_mini".to_string(),
            metric: TestMetric::Consistency,
            statistic: 1234.5678,
            p_value: 0.012345,
        }];
        let table = significance_table(&results);
        let mut lines = table.lines();
        assert_eq!(
            lines.next().unwrap(),
            "dataset,model1,model2,metric,statistic,p_value,significance"
        );
        assert_eq!(
            lines.next().unwrap(),
            "medmcqa,llama3.2,phi3_mini,consistency,1234.568,0.0123,*"
        );
    }

    #[test]
    fn test_write_table_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir
            .path()
            .join("results")
            .join("scored")
            .join(scored_table_name(DatasetKind::MedQa, "gemma2"));
        assert!(path.ends_with("medqa_gemma2.csv"));

        write_table("a,b\n1,2\n", &path).expect("write should succeed");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "a,b\n1,2\n");
    }
}
