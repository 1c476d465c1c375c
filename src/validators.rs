//! Shape validation
//!
//! Pure structural checks over a query, run before anything touches the
//! remote service:
//! - Fields: non-empty list, captions, sort priorities, function/calculation
//! - Filters: one filter per field, filter fields, per-type requirements
//!
//! Every check scans the whole list and every offender is reported in one
//! `StructuralError`, so a caller can fix everything in a single round trip.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::{ShapeIssue, StructuralError};
use crate::query::{Field, Filter, FilterField, Query};

/// Parse a query from JSON text, reporting malformed input as a shape error
pub fn parse_query(json: &str) -> Result<Query, StructuralError> {
    serde_json::from_str(json).map_err(|e| {
        StructuralError::single(ShapeIssue::Malformed {
            details: e.to_string(),
        })
    })
}

/// Parse a query from an already-decoded JSON value
pub fn parse_query_value(value: serde_json::Value) -> Result<Query, StructuralError> {
    serde_json::from_value(value).map_err(|e| {
        StructuralError::single(ShapeIssue::Malformed {
            details: e.to_string(),
        })
    })
}

/// Validate fields and filters of a query
pub fn validate_shape(query: &Query) -> Result<(), StructuralError> {
    let mut issues = field_issues(&query.fields);
    issues.extend(filter_issues(&query.filters));
    StructuralError::check(issues)
}

/// Validate the requested fields
pub fn validate_fields(fields: &[Field]) -> Result<(), StructuralError> {
    StructuralError::check(field_issues(fields))
}

/// Validate the query filters
pub fn validate_filters(filters: &[Filter]) -> Result<(), StructuralError> {
    StructuralError::check(filter_issues(filters))
}

fn field_issues(fields: &[Field]) -> Vec<ShapeIssue> {
    if fields.is_empty() {
        return vec![ShapeIssue::NoFields];
    }

    let mut issues = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        if field.field_caption.is_empty() {
            issues.push(ShapeIssue::EmptyFieldCaption { index });
        }
    }

    // Empty captions are already reported per position
    let duplicates = duplicated(
        fields
            .iter()
            .map(|f| f.field_caption.as_str())
            .filter(|c| !c.is_empty()),
    );
    if !duplicates.is_empty() {
        issues.push(ShapeIssue::DuplicateFieldCaptions {
            captions: duplicates,
        });
    }

    // BTreeMap keeps the report ordered by priority
    let mut by_priority: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for field in fields {
        if let Some(priority) = field.sort_priority {
            by_priority
                .entry(priority)
                .or_default()
                .push(field.field_caption.clone());
        }
    }
    for (priority, captions) in by_priority {
        if captions.len() > 1 {
            issues.push(ShapeIssue::DuplicateSortPriority { priority, captions });
        }
    }

    for field in fields {
        if field.function.is_some() && field.calculation.is_some() {
            issues.push(ShapeIssue::FunctionWithCalculation {
                caption: field.field_caption.clone(),
            });
        }
    }

    for field in fields {
        if let Some(value) = field.max_decimal_places.filter(|v| *v < 0) {
            issues.push(ShapeIssue::NegativeDecimalPlaces {
                caption: field.field_caption.clone(),
                value,
            });
        }
    }

    issues
}

fn filter_issues(filters: &[Filter]) -> Vec<ShapeIssue> {
    let mut issues = Vec::new();

    for caption in duplicated(filters.iter().filter_map(|f| f.field().caption_str())) {
        issues.push(ShapeIssue::DuplicateFilterField { caption });
    }

    for (index, filter) in filters.iter().enumerate() {
        let field = filter.field();

        if field.field_caption.is_none() && field.calculation.is_none() {
            issues.push(ShapeIssue::MissingFilterField { index });
            continue;
        }

        filter_field_issues(field, "Filter field", index, &mut issues);

        let caption = field.label().to_string();
        match filter {
            Filter::Set(set) => {
                require_plain(field, "SET", &mut issues);
                if set.values.is_empty() {
                    issues.push(ShapeIssue::EmptySetValues { caption });
                }
            }
            Filter::Match(m) => {
                require_plain(field, "MATCH", &mut issues);
                if !m.has_pattern() {
                    issues.push(ShapeIssue::EmptyMatchPattern { caption });
                }
            }
            Filter::Top(top) => {
                let measure = &top.field_to_measure;
                if measure.field_caption.is_none() && measure.calculation.is_none() {
                    issues.push(ShapeIssue::MissingMeasureField { index });
                } else {
                    filter_field_issues(measure, "fieldToMeasure", index, &mut issues);
                }
            }
            Filter::QuantitativeNumerical(_) => {}
            Filter::QuantitativeDate(q) => {
                for (bound, value) in q.bounds() {
                    if !is_valid_date(value) {
                        issues.push(ShapeIssue::InvalidDate {
                            caption: caption.clone(),
                            bound: bound.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            Filter::Date(date) => {
                require_plain(field, "DATE", &mut issues);
                let range_type = date.date_range_type;
                match (range_type.takes_range_n(), date.range_n) {
                    (true, None) => issues.push(ShapeIssue::MissingRangeN {
                        caption: caption.clone(),
                        date_range_type: range_type.as_str().to_string(),
                    }),
                    (false, Some(_)) => issues.push(ShapeIssue::UnexpectedRangeN {
                        caption: caption.clone(),
                        date_range_type: range_type.as_str().to_string(),
                    }),
                    _ => {}
                }
                if let Some(anchor) = date.anchor_date.as_deref() {
                    if !is_valid_date(anchor) {
                        issues.push(ShapeIssue::InvalidDate {
                            caption,
                            bound: "anchorDate".to_string(),
                            value: anchor.to_string(),
                        });
                    }
                }
            }
        }
    }

    issues
}

/// Structural checks shared by filter fields and TOP's fieldToMeasure
fn filter_field_issues(
    field: &FilterField,
    context: &str,
    index: usize,
    issues: &mut Vec<ShapeIssue>,
) {
    if field.field_caption.as_deref() == Some("") {
        issues.push(ShapeIssue::EmptyFilterFieldCaption {
            context: context.to_string(),
            index,
        });
    }
    if field.calculation.is_some() {
        if let Some(caption) = field.caption_str() {
            issues.push(ShapeIssue::CaptionWithCalculation {
                context: context.to_string(),
                caption: caption.to_string(),
            });
        }
        if field.function.is_some() {
            issues.push(ShapeIssue::FilterFunctionWithCalculation {
                context: context.to_string(),
                caption: field.label().to_string(),
            });
        }
    }
}

fn require_plain(field: &FilterField, filter_type: &str, issues: &mut Vec<ShapeIssue>) {
    if !field.is_plain() {
        issues.push(ShapeIssue::FilterFieldNotPlain {
            filter_type: filter_type.to_string(),
            caption: field.label().to_string(),
        });
    }
}

/// Values that occur more than once, each reported once in first-seen order
fn duplicated<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter(|v| counts.get(v).copied().unwrap_or(0) > 1)
        .map(String::from)
        .collect()
}

/// Accepts RFC 3339 date-times, naive ISO date-times and plain dates
pub fn is_valid_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

// ============================================================================
// TESTS
// ============================================================================
