//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - QG-000-009: Query shape errors
//! - QG-010-019: Filter value errors
//! - QG-020-029: Pagination errors
//! - QG-030-039: Remote errors
//! - QG-040-049: Config and cancellation errors

use thiserror::Error;

use crate::errors::{FilterValidationError, StructuralError};

pub type Result<T> = std::result::Result<T, GuardError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Opaque failure reported by a remote-call collaborator.
///
/// Timeouts, transport failures and non-success responses all end up here;
/// nothing inside this crate retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", format_remote(.status, .message))]
pub struct RemoteError {
    /// HTTP status when the remote answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

fn format_remote(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("remote returned {}: {}", code, message),
        None => message.to_string(),
    }
}

fn format_filter_errors(errors: &[FilterValidationError]) -> String {
    match errors {
        [] => "no errors".to_string(),
        [only] => only.message.clone(),
        many => format!(
            "{} filters: {}",
            many.len(),
            many.iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        ),
    }
}

/// All failures surfaced by the validation pipeline.
#[derive(Error, Debug)]
pub enum GuardError {
    // ═══════════════════════════════════════════
    // SHAPE ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[QG-001] Invalid query: {0}")]
    Structural(#[from] StructuralError),

    // ═══════════════════════════════════════════
    // FILTER VALUE ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[QG-010] Filter validation failed for {}", format_filter_errors(.errors))]
    FilterValidation { errors: Vec<FilterValidationError> },

    // ═══════════════════════════════════════════
    // PAGINATION ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error(
        "[QG-020] No more data available. Last fetched page number: {page_number}, \
         Total available: {total_available}, Total fetched: {fetched}"
    )]
    PaginationExhausted {
        page_number: u64,
        total_available: u64,
        fetched: usize,
    },

    #[error("[QG-021] Invalid page config: {reason}")]
    InvalidPageConfig { reason: String },

    // ═══════════════════════════════════════════
    // REMOTE ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[QG-030] Remote query failed: {0}")]
    Remote(#[from] RemoteError),

    // ═══════════════════════════════════════════
    // CONFIG / CANCELLATION (040-049)
    // ═══════════════════════════════════════════
    #[error("[QG-040] Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("[QG-042] Operation cancelled")]
    Cancelled,
}

impl GuardError {
    /// Error code for programmatic handling (e.g. "QG-010")
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::Structural(_) => "QG-001",
            GuardError::FilterValidation { .. } => "QG-010",
            GuardError::PaginationExhausted { .. } => "QG-020",
            GuardError::InvalidPageConfig { .. } => "QG-021",
            GuardError::Remote(_) => "QG-030",
            GuardError::ConfigError { .. } => "QG-040",
            GuardError::Cancelled => "QG-042",
        }
    }

    /// Filter errors when this is a filter validation failure
    pub fn filter_errors(&self) -> Option<&[FilterValidationError]> {
        match self {
            GuardError::FilterValidation { errors } => Some(errors),
            _ => None,
        }
    }
}

impl FixSuggestion for GuardError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            GuardError::Structural(_) => {
                Some("Fix every listed field or filter and resubmit the whole query")
            }
            GuardError::FilterValidation { .. } => {
                Some("Use one of the suggested values, or filter on a different field")
            }
            GuardError::PaginationExhausted { .. } => {
                Some("The remote reported more rows than it returned; retry later or lower the limit")
            }
            GuardError::InvalidPageConfig { .. } => {
                Some("pageSize, pageNumber and limit must be positive integers")
            }
            GuardError::Remote(_) => Some("Check the server URL, token and network connectivity"),
            GuardError::ConfigError { .. } => Some("Check ~/.config/query-guard/config.toml syntax"),
            GuardError::Cancelled => None,
        }
    }
}
