//! Core vocabulary shared across the pipeline.
//!
//! Every stage speaks in terms of these types: which answer scheme a dataset
//! uses, which symbols are valid under it, the five prompt styles, and the
//! outcome classification of a scored question. All of them are small copy
//! types with a fixed canonical order so that iteration, tie-breaking and
//! export columns stay deterministic.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Label used for an extraction that resolved to no valid symbol.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Answer-format scheme of a dataset.
///
/// The scheme decides which symbols are valid and in which canonical order
/// they are compared when tallies tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerScheme {
    /// Four-option single answer: A, B, C, D.
    MultipleChoice,
    /// Ternary literature answer: yes, no, maybe.
    YesNoMaybe,
}

impl AnswerScheme {
    /// Valid symbols of this scheme, in canonical order.
    ///
    /// The order is the tie-break order: A < B < C < D and
    /// yes < no < maybe.
    pub fn symbols(&self) -> &'static [AnswerSymbol] {
        match self {
            AnswerScheme::MultipleChoice => &[
                AnswerSymbol::A,
                AnswerSymbol::B,
                AnswerSymbol::C,
                AnswerSymbol::D,
            ],
            AnswerScheme::YesNoMaybe => {
                &[AnswerSymbol::Yes, AnswerSymbol::No, AnswerSymbol::Maybe]
            }
        }
    }

    /// Whether `symbol` belongs to this scheme.
    pub fn contains(&self, symbol: AnswerSymbol) -> bool {
        self.symbols().contains(&symbol)
    }
}

impl fmt::Display for AnswerScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerScheme::MultipleChoice => write!(f, "multiple_choice"),
            AnswerScheme::YesNoMaybe => write!(f, "yes_no_maybe"),
        }
    }
}

/// A valid answer symbol under some scheme.
///
/// The two schemes share one symbol space because their members are
/// disjoint; `AnswerScheme::contains` guards cross-scheme mixups at the
/// boundaries that matter (record construction, extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerSymbol {
    A,
    B,
    C,
    D,
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "maybe")]
    Maybe,
}

impl AnswerSymbol {
    /// Canonical text form: uppercase letters, lowercase ternary words.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSymbol::A => "A",
            AnswerSymbol::B => "B",
            AnswerSymbol::C => "C",
            AnswerSymbol::D => "D",
            AnswerSymbol::Yes => "yes",
            AnswerSymbol::No => "no",
            AnswerSymbol::Maybe => "maybe",
        }
    }

    /// Parse a symbol belonging to `scheme`, case-insensitively.
    ///
    /// Returns `None` for anything that is not exactly one valid symbol of
    /// the scheme, including symbols of the other scheme.
    pub fn parse(text: &str, scheme: AnswerScheme) -> Option<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        let symbol = match lowered.as_str() {
            "a" => AnswerSymbol::A,
            "b" => AnswerSymbol::B,
            "c" => AnswerSymbol::C,
            "d" => AnswerSymbol::D,
            "yes" => AnswerSymbol::Yes,
            "no" => AnswerSymbol::No,
            "maybe" => AnswerSymbol::Maybe,
            _ => return None,
        };
        scheme.contains(symbol).then_some(symbol)
    }
}

impl fmt::Display for AnswerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of extracting an answer from raw model text.
///
/// `Unresolved` is data, not an error: it records that the text committed to
/// no single valid symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractedAnswer {
    Symbol(AnswerSymbol),
    Unresolved,
}

impl ExtractedAnswer {
    pub fn symbol(&self) -> Option<AnswerSymbol> {
        match self {
            ExtractedAnswer::Symbol(s) => Some(*s),
            ExtractedAnswer::Unresolved => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ExtractedAnswer::Unresolved)
    }

    /// Text form used in exports: the symbol text, or `UNKNOWN`.
    pub fn label(&self) -> &'static str {
        match self {
            ExtractedAnswer::Symbol(s) => s.as_str(),
            ExtractedAnswer::Unresolved => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for ExtractedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ExtractedAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ExtractedAnswer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == UNKNOWN_LABEL {
            return Ok(ExtractedAnswer::Unresolved);
        }
        // Symbol spaces are disjoint, so parsing without a scheme is safe.
        AnswerSymbol::parse(&text, AnswerScheme::MultipleChoice)
            .or_else(|| AnswerSymbol::parse(&text, AnswerScheme::YesNoMaybe))
            .map(ExtractedAnswer::Symbol)
            .ok_or_else(|| D::Error::custom(format!("unknown answer label: {text}")))
    }
}

/// The five stylistic rewordings applied to every question.
///
/// The derived ordering follows declaration order, which is the canonical
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// Dataset wording, untouched.
    Original,
    /// Formal academic register.
    Formal,
    /// Plain-language simplification.
    Simplified,
    /// Framed as advice to a colleague.
    Roleplay,
    /// Stripped to a bare instruction.
    Direct,
}

impl PromptStyle {
    /// All styles in canonical order. Iteration, record validation and
    /// export columns all follow this order.
    pub const ALL: [PromptStyle; 5] = [
        PromptStyle::Original,
        PromptStyle::Formal,
        PromptStyle::Simplified,
        PromptStyle::Roleplay,
        PromptStyle::Direct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Original => "original",
            PromptStyle::Formal => "formal",
            PromptStyle::Simplified => "simplified",
            PromptStyle::Roleplay => "roleplay",
            PromptStyle::Direct => "direct",
        }
    }

    /// Position in the canonical order.
    pub fn index(&self) -> usize {
        PromptStyle::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(PromptStyle::Original),
            "formal" => Ok(PromptStyle::Formal),
            "simplified" => Ok(PromptStyle::Simplified),
            "roleplay" => Ok(PromptStyle::Roleplay),
            "direct" => Ok(PromptStyle::Direct),
            other => Err(format!("unknown prompt style: {other}")),
        }
    }
}

/// The three benchmark datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    MedQa,
    MedMcqa,
    PubMedQa,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::MedQa,
        DatasetKind::MedMcqa,
        DatasetKind::PubMedQa,
    ];

    /// Answer scheme the dataset's questions use.
    pub fn scheme(&self) -> AnswerScheme {
        match self {
            DatasetKind::MedQa | DatasetKind::MedMcqa => AnswerScheme::MultipleChoice,
            DatasetKind::PubMedQa => AnswerScheme::YesNoMaybe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::MedQa => "medqa",
            DatasetKind::MedMcqa => "medmcqa",
            DatasetKind::PubMedQa => "pubmedqa",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medqa" => Ok(DatasetKind::MedQa),
            "medmcqa" => Ok(DatasetKind::MedMcqa),
            "pubmedqa" => Ok(DatasetKind::PubMedQa),
            other => Err(format!("unknown dataset: {other}")),
        }
    }
}

/// Failure classification of a scored question.
///
/// Exactly one mode applies per question; `None` is the healthy case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// No failure observed.
    None,
    /// Between one and four of the five extractions were unresolved.
    PartialUnknown,
    /// All five extractions were unresolved.
    FullUnknown,
    /// A clear valid majority exists and disagrees with the ground truth.
    InconsistentWrong,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::None => "none",
            FailureMode::PartialUnknown => "partial_unknown",
            FailureMode::FullUnknown => "full_unknown",
            FailureMode::InconsistentWrong => "inconsistent_wrong",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_symbol_order_is_stable() {
        assert_eq!(
            AnswerScheme::MultipleChoice.symbols(),
            &[
                AnswerSymbol::A,
                AnswerSymbol::B,
                AnswerSymbol::C,
                AnswerSymbol::D
            ]
        );
        assert_eq!(
            AnswerScheme::YesNoMaybe.symbols(),
            &[AnswerSymbol::Yes, AnswerSymbol::No, AnswerSymbol::Maybe]
        );
    }

    #[test]
    fn test_symbol_parse_is_scheme_scoped() {
        assert_eq!(
            AnswerSymbol::parse("b", AnswerScheme::MultipleChoice),
            Some(AnswerSymbol::B)
        );
        assert_eq!(
            AnswerSymbol::parse("  YES ", AnswerScheme::YesNoMaybe),
            Some(AnswerSymbol::Yes)
        );
        // Valid word, wrong scheme.
        assert_eq!(AnswerSymbol::parse("maybe", AnswerScheme::MultipleChoice), None);
        assert_eq!(AnswerSymbol::parse("c", AnswerScheme::YesNoMaybe), None);
        assert_eq!(AnswerSymbol::parse("e", AnswerScheme::MultipleChoice), None);
        assert_eq!(AnswerSymbol::parse("", AnswerScheme::MultipleChoice), None);
    }

    #[test]
    fn test_extracted_answer_labels() {
        assert_eq!(ExtractedAnswer::Symbol(AnswerSymbol::C).label(), "C");
        assert_eq!(ExtractedAnswer::Symbol(AnswerSymbol::Maybe).label(), "maybe");
        assert_eq!(ExtractedAnswer::Unresolved.label(), "UNKNOWN");
    }

    #[test]
    fn test_extracted_answer_serde_round_trip() {
        for answer in [
            ExtractedAnswer::Symbol(AnswerSymbol::A),
            ExtractedAnswer::Symbol(AnswerSymbol::No),
            ExtractedAnswer::Unresolved,
        ] {
            let json = serde_json::to_string(&answer).unwrap();
            let back: ExtractedAnswer = serde_json::from_str(&json).unwrap();
            assert_eq!(answer, back);
        }
        assert!(serde_json::from_str::<ExtractedAnswer>("\"E\"").is_err());
    }

    #[test]
    fn test_style_order_and_parse() {
        assert_eq!(PromptStyle::ALL.len(), 5);
        assert_eq!(PromptStyle::ALL[0], PromptStyle::Original);
        assert_eq!(PromptStyle::ALL[4], PromptStyle::Direct);
        assert_eq!(PromptStyle::Roleplay.index(), 3);
        assert_eq!("Formal".parse::<PromptStyle>(), Ok(PromptStyle::Formal));
        assert!("casual".parse::<PromptStyle>().is_err());
    }

    #[test]
    fn test_dataset_scheme_mapping() {
        assert_eq!(DatasetKind::MedQa.scheme(), AnswerScheme::MultipleChoice);
        assert_eq!(DatasetKind::MedMcqa.scheme(), AnswerScheme::MultipleChoice);
        assert_eq!(DatasetKind::PubMedQa.scheme(), AnswerScheme::YesNoMaybe);
        assert_eq!("pubmedqa".parse::<DatasetKind>(), Ok(DatasetKind::PubMedQa));
    }

    #[test]
    fn test_failure_mode_snake_case_serde() {
        let json = serde_json::to_string(&FailureMode::InconsistentWrong).unwrap();
        assert_eq!(json, "\"inconsistent_wrong\"");
        let back: FailureMode = serde_json::from_str("\"partial_unknown\"").unwrap();
        assert_eq!(back, FailureMode::PartialUnknown);
    }
}
