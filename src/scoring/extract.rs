//! Answer extraction from raw model text.
//!
//! Maps free-form completion text to a single valid answer symbol or
//! `Unresolved`. The grammar is deliberately closed: it recognizes the
//! answer shapes short deterministic completions actually produce, and
//! anything ambiguous stays `Unresolved` rather than being guessed at.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{AnswerScheme, AnswerSymbol, ExtractedAnswer};

/// Label terms that may introduce an answer, e.g. "Answer: B" or
/// "the correct option is (c)".
static MCQ_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:answer|ans|option|choice)\b(?:\s+(?:is|was))?\s*[:=-]?\s*\(?\s*([abcd])\b")
        .expect("invalid multiple-choice label pattern")
});

static YNM_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:answer|ans|option|choice)\b(?:\s+(?:is|was))?\s*[:=-]?\s*\(?\s*(yes|no|maybe)\b")
        .expect("invalid yes/no/maybe label pattern")
});

/// Standalone symbol tokens anywhere in the text.
static MCQ_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([abcd])\b").expect("invalid multiple-choice token pattern"));

static YNM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(yes|no|maybe)\b").expect("invalid yes/no/maybe token pattern"));

/// Punctuation that may wrap a bare answer line, e.g. "B.", "(c)", "**a**".
const WRAPPING: &str = ".,:;!?\"'()*-";

/// Extract one answer symbol from raw model text under the given scheme.
///
/// The text is trimmed and lowercased, then markers are tried in priority
/// order, first hit wins:
///
/// 1. a line that is exactly one valid symbol once wrapping punctuation is
///    stripped;
/// 2. a valid symbol immediately following a label term ("answer",
///    "ans", "option", "choice", optionally joined by "is"/"was" and a
///    separator);
/// 3. valid symbols appearing as standalone tokens anywhere: exactly one
///    distinct symbol resolves to that symbol, zero or several distinct
///    symbols stay unresolved.
///
/// Pure and total: every input, including the empty string, maps to exactly
/// one output.
pub fn extract(text: &str, scheme: AnswerScheme) -> ExtractedAnswer {
    let normalized = text.trim().to_lowercase();

    if let Some(symbol) = bare_symbol_line(&normalized, scheme) {
        return ExtractedAnswer::Symbol(symbol);
    }

    if let Some(symbol) = labeled_symbol(&normalized, scheme) {
        return ExtractedAnswer::Symbol(symbol);
    }

    match sole_token(&normalized, scheme) {
        Some(symbol) => ExtractedAnswer::Symbol(symbol),
        None => ExtractedAnswer::Unresolved,
    }
}

/// Priority 1: the first line consisting solely of a valid symbol.
fn bare_symbol_line(normalized: &str, scheme: AnswerScheme) -> Option<AnswerSymbol> {
    normalized.lines().find_map(|line| {
        let stripped = line.trim_matches(|c: char| c.is_whitespace() || WRAPPING.contains(c));
        AnswerSymbol::parse(stripped, scheme)
    })
}

/// Priority 2: the first symbol introduced by a label term.
fn labeled_symbol(normalized: &str, scheme: AnswerScheme) -> Option<AnswerSymbol> {
    let pattern = match scheme {
        AnswerScheme::MultipleChoice => &*MCQ_LABEL,
        AnswerScheme::YesNoMaybe => &*YNM_LABEL,
    };
    let captures = pattern.captures(normalized)?;
    AnswerSymbol::parse(captures.get(1)?.as_str(), scheme)
}

/// Priority 3: standalone symbol tokens; unambiguous only if a single
/// distinct symbol occurs.
fn sole_token(normalized: &str, scheme: AnswerScheme) -> Option<AnswerSymbol> {
    let pattern = match scheme {
        AnswerScheme::MultipleChoice => &*MCQ_TOKEN,
        AnswerScheme::YesNoMaybe => &*YNM_TOKEN,
    };

    let mut found: Option<AnswerSymbol> = None;
    for captures in pattern.captures_iter(normalized) {
        let symbol = AnswerSymbol::parse(captures.get(1)?.as_str(), scheme)?;
        match found {
            None => found = Some(symbol),
            Some(previous) if previous != symbol => return None,
            Some(_) => {}
        }
    }
    found
}
