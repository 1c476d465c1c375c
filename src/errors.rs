//! Validation error types
//!
//! Structured errors for the two validation layers:
//! - Shape: `ShapeIssue` / `StructuralError` (pure, no I/O)
//! - Values: `FilterValidationError` (checked against live data)

use serde::Serialize;
use thiserror::Error;

/// A single structural problem found in a query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ShapeIssue {
    // Parsing
    #[error("Malformed query: {details}")]
    Malformed { details: String },

    // Fields
    #[error("The query must include at least one field")]
    NoFields,

    #[error("Field at position {index} has an empty fieldCaption")]
    EmptyFieldCaption { index: usize },

    #[error("Duplicate field captions: {}", quote_all(.captions))]
    DuplicateFieldCaptions { captions: Vec<String> },

    #[error("Fields {} share sortPriority {priority}", quote_all(.captions))]
    DuplicateSortPriority { priority: i64, captions: Vec<String> },

    #[error("Field '{caption}' combines a function with a calculation")]
    FunctionWithCalculation { caption: String },

    #[error("Field '{caption}' has negative maxDecimalPlaces ({value})")]
    NegativeDecimalPlaces { caption: String, value: i64 },

    // Filters
    #[error("Filter at position {index} does not name a field")]
    MissingFilterField { index: usize },

    #[error("fieldToMeasure of TOP filter at position {index} does not name a field")]
    MissingMeasureField { index: usize },

    #[error("Multiple filters target field '{caption}'")]
    DuplicateFilterField { caption: String },

    #[error("{context} at position {index} has an empty fieldCaption")]
    EmptyFilterFieldCaption { context: String, index: usize },

    #[error("{context} '{caption}' combines a fieldCaption with a calculation")]
    CaptionWithCalculation { context: String, caption: String },

    #[error("{context} '{caption}' combines a function with a calculation")]
    FilterFunctionWithCalculation { context: String, caption: String },

    #[error("{filter_type} filter on '{caption}' must reference a plain field without function or calculation")]
    FilterFieldNotPlain { filter_type: String, caption: String },

    #[error("SET filter on '{caption}' must list at least one value")]
    EmptySetValues { caption: String },

    #[error("MATCH filter on '{caption}' needs at least one of startsWith, endsWith or contains")]
    EmptyMatchPattern { caption: String },

    #[error("Filter on '{caption}' has an invalid {bound}: '{value}'")]
    InvalidDate {
        caption: String,
        bound: String,
        value: String,
    },

    #[error("DATE filter on '{caption}' requires rangeN for {date_range_type}")]
    MissingRangeN {
        caption: String,
        date_range_type: String,
    },

    #[error("DATE filter on '{caption}' must not set rangeN for {date_range_type}")]
    UnexpectedRangeN {
        caption: String,
        date_range_type: String,
    },
}

fn quote_all(captions: &[String]) -> String {
    captions
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every structural problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", format_issues(.issues))]
pub struct StructuralError {
    pub issues: Vec<ShapeIssue>,
}

impl StructuralError {
    pub fn new(issues: Vec<ShapeIssue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: ShapeIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Ok when no issues were collected
    pub fn check(issues: Vec<ShapeIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

fn format_issues(issues: &[ShapeIssue]) -> String {
    match issues {
        [] => "no problems".to_string(),
        [only] => only.to_string(),
        many => format!(
            "{} problems: {}",
            many.len(),
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

/// A SET or MATCH filter whose value does not exist in the live data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValidationError {
    /// Field caption the filter targets
    pub field: String,
    /// Offending values (SET) or predicate descriptions (MATCH)
    pub invalid_values: Vec<String>,
    /// At most 5 close candidates taken from the live data
    pub sample_values: Vec<String>,
    pub message: String,
}

impl std::fmt::Display for FilterValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
