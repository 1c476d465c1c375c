//! Filter Value Corrector
//!
//! Checks SET and MATCH filter values against live data before the real
//! query runs, and proposes corrections for values that do not exist.
//!
//! ## Flow
//!
//! ```text
//! for each SET/MATCH filter with a caption:
//!     fetch distinct values (SET) or a value sample (MATCH)
//!     SET   → every requested value must appear verbatim
//!     MATCH → some sampled value must satisfy every predicate
//!     invalid → FilterValidationError with up to 5 suggestions
//! ```
//!
//! A failed lookup never fails the query: the filter is treated as valid and
//! a warning is logged and recorded on the [`CorrectionReport`].

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

use crate::config::{ValidationSettings, DEFAULT_SAMPLE_ROW_LIMIT};
use crate::error::{GuardError, RemoteError};
use crate::errors::FilterValidationError;
use crate::fuzzy::{
    fuzzy_contains, fuzzy_ends_with, fuzzy_starts_with, get_fuzzy_matches,
    DEFAULT_MAX_DISTANCE, DEFAULT_MAX_SUGGESTIONS,
};
use crate::query::{
    coerce_or_null, DatasourceRef, Filter, MatchFilter, Query, QueryOptions, QueryOutput,
    QueryRequest, ReturnFormat, SetFilter,
};
use crate::remote::QueryExecutor;

const RECONSIDER_HINT: &str = "Please evaluate whether you included the wrong filter value \
     or if you are trying to filter on the wrong field entirely.";

/// Tuning for suggestion generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionOptions {
    /// SET suggestions further than this are dropped
    pub max_distance: usize,
    /// Suggestions per filter
    pub max_suggestions: usize,
    /// Rows fetched when sampling for MATCH filters
    pub sample_row_limit: u64,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            sample_row_limit: DEFAULT_SAMPLE_ROW_LIMIT,
        }
    }
}

impl From<&ValidationSettings> for CorrectionOptions {
    fn from(settings: &ValidationSettings) -> Self {
        Self {
            max_distance: settings.max_distance,
            max_suggestions: settings.max_suggestions,
            sample_row_limit: settings.sample_row_limit,
        }
    }
}

/// Outcome of checking every qualifying filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    /// One entry per offending filter, in query order
    pub errors: Vec<FilterValidationError>,
    /// Filters that could not be verified because the lookup failed
    pub warnings: Vec<String>,
}

impl CorrectionReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), GuardError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(GuardError::FilterValidation {
                errors: self.errors,
            })
        }
    }
}

/// A single MATCH predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate<'a> {
    StartsWith(&'a str),
    EndsWith(&'a str),
    Contains(&'a str),
}

impl<'a> Predicate<'a> {
    fn all(filter: &'a MatchFilter) -> Vec<Self> {
        let mut predicates = Vec::new();
        if let Some(p) = filter.starts_with.as_deref() {
            predicates.push(Predicate::StartsWith(p));
        }
        if let Some(p) = filter.ends_with.as_deref() {
            predicates.push(Predicate::EndsWith(p));
        }
        if let Some(p) = filter.contains.as_deref() {
            predicates.push(Predicate::Contains(p));
        }
        predicates
    }

    fn matches(self, value: &str) -> bool {
        match self {
            Predicate::StartsWith(p) => value.starts_with(p),
            Predicate::EndsWith(p) => value.ends_with(p),
            Predicate::Contains(p) => value.contains(p),
        }
    }

    fn roughly_matches(self, value: &str) -> bool {
        match self {
            Predicate::StartsWith(p) => fuzzy_starts_with(value, p),
            Predicate::EndsWith(p) => fuzzy_ends_with(value, p),
            Predicate::Contains(p) => fuzzy_contains(value, p),
        }
    }

    fn describe(self) -> String {
        match self {
            Predicate::StartsWith(p) => format!("starts with \"{}\"", p),
            Predicate::EndsWith(p) => format!("ends with \"{}\"", p),
            Predicate::Contains(p) => format!("contains \"{}\"", p),
        }
    }
}

/// Checks filter values of one query against one datasource
pub struct FilterValueCorrector<'a> {
    executor: &'a dyn QueryExecutor,
    datasource: &'a DatasourceRef,
    options: CorrectionOptions,
}

impl<'a> FilterValueCorrector<'a> {
    pub fn new(executor: &'a dyn QueryExecutor, datasource: &'a DatasourceRef) -> Self {
        Self {
            executor,
            datasource,
            options: CorrectionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CorrectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Check every SET and MATCH filter, one lookup each, in query order.
    ///
    /// Only cancellation is returned as an error; invalid values land in the
    /// report and failed lookups become warnings.
    pub async fn check(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<CorrectionReport, GuardError> {
        let mut report = CorrectionReport::default();

        for filter in &query.filters {
            let Some(caption) = filter.field().caption_str() else {
                continue;
            };

            let outcome = match filter {
                Filter::Set(set) => {
                    ensure_not_cancelled(cancel)?;
                    self.check_set(caption, set).await
                }
                Filter::Match(m) if m.has_pattern() => {
                    ensure_not_cancelled(cancel)?;
                    self.check_match(caption, m).await
                }
                _ => continue,
            };

            match outcome {
                Ok(Some(error)) => {
                    tracing::debug!(
                        field = %caption,
                        invalid = ?error.invalid_values,
                        suggestions = ?error.sample_values,
                        "Filter value not found in live data"
                    );
                    report.errors.push(error);
                }
                Ok(None) => {}
                Err(remote) => {
                    tracing::warn!(
                        field = %caption,
                        executor = self.executor.name(),
                        error = %remote,
                        "Could not verify filter values, assuming valid"
                    );
                    report.warnings.push(format!(
                        "Values of filter on '{}' were not verified: {}",
                        caption, remote
                    ));
                }
            }
        }

        Ok(report)
    }

    async fn fetch_values(
        &self,
        caption: &str,
        row_limit: Option<u64>,
    ) -> Result<QueryOutput, RemoteError> {
        let request = QueryRequest::new(self.datasource.clone(), Query::distinct_values_of(caption))
            .with_options(QueryOptions {
                return_format: ReturnFormat::Objects,
                disaggregate: false,
                row_limit,
            });
        self.executor.execute_query(&request).await
    }

    async fn check_set(
        &self,
        caption: &str,
        filter: &SetFilter,
    ) -> Result<Option<FilterValidationError>, RemoteError> {
        // null compares as "null" on both sides
        let existing = dedup(
            self.fetch_values(caption, None)
                .await?
                .column_values_with_nulls(caption),
        );
        let known: HashSet<&str> = existing.iter().map(String::as_str).collect();

        let requested = dedup(filter.values.iter().map(coerce_or_null).collect());
        let invalid: Vec<String> = requested
            .into_iter()
            .filter(|v| !known.contains(v.as_str()))
            .collect();

        if invalid.is_empty() {
            return Ok(None);
        }

        let suggestions = get_fuzzy_matches(
            &invalid,
            &existing,
            self.options.max_distance,
            self.options.max_suggestions,
        );

        let mut message = format!(
            "Filter validation failed for field \"{}\". The following values were not found: {}.",
            caption,
            quote_list(&invalid)
        );
        if !suggestions.is_empty() {
            message.push_str(&format!(" Did you mean: {}?", suggestions.join(", ")));
        }
        message.push(' ');
        message.push_str(RECONSIDER_HINT);

        Ok(Some(FilterValidationError {
            field: caption.to_string(),
            invalid_values: invalid,
            sample_values: suggestions,
            message,
        }))
    }

    async fn check_match(
        &self,
        caption: &str,
        filter: &MatchFilter,
    ) -> Result<Option<FilterValidationError>, RemoteError> {
        let predicates = Predicate::all(filter);
        let sample = dedup(
            self.fetch_values(caption, Some(self.options.sample_row_limit))
                .await?
                .column_values(caption),
        );

        if sample
            .iter()
            .any(|value| predicates.iter().all(|p| p.matches(value)))
        {
            return Ok(None);
        }

        let invalid: Vec<String> = predicates.iter().map(|p| p.describe()).collect();

        let mut similar = Vec::new();
        for value in &sample {
            if similar.len() >= self.options.max_suggestions {
                break;
            }
            if predicates.iter().all(|p| p.roughly_matches(value)) {
                similar.push(value.clone());
            }
        }

        let mut message = format!(
            "Filter validation failed for field \"{}\". No values found that {}.",
            caption,
            invalid.join(" and ")
        );
        if !similar.is_empty() {
            message.push_str(&format!(
                " Similar values in this field: {}.",
                similar.join(", ")
            ));
        }
        message.push(' ');
        message.push_str(RECONSIDER_HINT);

        Ok(Some(FilterValidationError {
            field: caption.to_string(),
            invalid_values: invalid,
            sample_values: similar,
            message,
        }))
    }
}

/// Check SET/MATCH filter values of `query` against live data.
///
/// Succeeds when no filter produced an error; otherwise returns
/// [`GuardError::FilterValidation`] with one entry per offending filter.
pub async fn correct_filter_values(
    query: &Query,
    executor: &dyn QueryExecutor,
    datasource: &DatasourceRef,
    options: &CorrectionOptions,
    cancel: &CancellationToken,
) -> Result<(), GuardError> {
    FilterValueCorrector::new(executor, datasource)
        .with_options(options.clone())
        .check(query, cancel)
        .await?
        .into_result()
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), GuardError> {
    if cancel.is_cancelled() {
        Err(GuardError::Cancelled)
    } else {
        Ok(())
    }
}

/// Drop repeats, keeping first occurrences in order
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================
