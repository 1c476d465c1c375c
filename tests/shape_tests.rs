//! Shape validation over wire-format queries
//!
//! Queries are parsed from JSON exactly as a caller would send them, then
//! run through `validate_shape`.

use query_guard::errors::{ShapeIssue, StructuralError};
use query_guard::validators::{parse_query_value, validate_shape};
use serde_json::{json, Value};

fn issues_of(value: Value) -> Vec<ShapeIssue> {
    let query = match parse_query_value(value) {
        Ok(query) => query,
        Err(StructuralError { issues }) => return issues,
    };
    match validate_shape(&query) {
        Ok(()) => Vec::new(),
        Err(error) => error.issues,
    }
}

// ============================================================================
// Valid queries
// ============================================================================

#[test]
fn test_realistic_query_passes() {
    let issues = issues_of(json!({
        "fields": [
            { "fieldCaption": "Region" },
            { "fieldCaption": "Sales", "function": "SUM", "sortDirection": "DESC", "sortPriority": 1 },
            { "fieldCaption": "Margin", "calculation": "SUM([Profit]) / SUM([Sales])", "maxDecimalPlaces": 2 }
        ],
        "filters": [
            { "filterType": "SET", "field": { "fieldCaption": "Region" }, "values": ["East", "West"], "exclude": false },
            { "filterType": "MATCH", "field": { "fieldCaption": "Customer" }, "contains": "Corp" },
            { "filterType": "TOP", "field": { "fieldCaption": "Product" }, "howMany": 10,
              "fieldToMeasure": { "fieldCaption": "Sales", "function": "SUM" }, "direction": "TOP" },
            { "filterType": "QUANTITATIVE_NUMERICAL", "quantitativeFilterType": "RANGE",
              "field": { "fieldCaption": "Quantity" }, "min": 1, "max": 100 },
            { "filterType": "QUANTITATIVE_DATE", "quantitativeFilterType": "MIN",
              "field": { "fieldCaption": "Ship Date" }, "minDate": "2024-01-01" },
            { "filterType": "DATE", "field": { "fieldCaption": "Order Date" },
              "periodType": "MONTHS", "dateRangeType": "LASTN", "rangeN": 3 }
        ]
    }));
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn test_calculation_only_filter_field_allowed_on_quantitative() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Region" }],
        "filters": [{
            "filterType": "QUANTITATIVE_NUMERICAL", "quantitativeFilterType": "MIN",
            "field": { "calculation": "[Sales] * 2" }, "min": 10
        }]
    }));
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

// ============================================================================
// Field rules
// ============================================================================

#[test]
fn test_no_fields() {
    assert_eq!(issues_of(json!({ "fields": [] })), vec![ShapeIssue::NoFields]);
}

#[test]
fn test_all_field_problems_reported_together() {
    let issues = issues_of(json!({
        "fields": [
            { "fieldCaption": "Sales", "sortPriority": 1 },
            { "fieldCaption": "Profit", "sortPriority": 1, "function": "SUM", "calculation": "[A]" },
            { "fieldCaption": "Sales", "maxDecimalPlaces": -1 }
        ]
    }));
    assert!(issues.contains(&ShapeIssue::DuplicateFieldCaptions {
        captions: vec!["Sales".into()]
    }));
    assert!(issues.contains(&ShapeIssue::DuplicateSortPriority {
        priority: 1,
        captions: vec!["Sales".into(), "Profit".into()]
    }));
    assert!(issues.contains(&ShapeIssue::FunctionWithCalculation {
        caption: "Profit".into()
    }));
    assert!(issues.contains(&ShapeIssue::NegativeDecimalPlaces {
        caption: "Sales".into(),
        value: -1
    }));
}

// ============================================================================
// Filter rules
// ============================================================================

#[test]
fn test_two_filters_on_one_field() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [
            { "filterType": "SET", "field": { "fieldCaption": "Region" }, "values": ["East"] },
            { "filterType": "MATCH", "field": { "fieldCaption": "Region" }, "startsWith": "W" }
        ]
    }));
    assert_eq!(
        issues,
        vec![ShapeIssue::DuplicateFilterField {
            caption: "Region".into()
        }]
    );
}

#[test]
fn test_set_filter_on_aggregated_field() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{
            "filterType": "SET", "field": { "fieldCaption": "Sales", "function": "SUM" }, "values": [100]
        }]
    }));
    assert_eq!(
        issues,
        vec![ShapeIssue::FilterFieldNotPlain {
            filter_type: "SET".into(),
            caption: "Sales".into()
        }]
    );
}

#[test]
fn test_match_without_pattern() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{ "filterType": "MATCH", "field": { "fieldCaption": "Customer" } }]
    }));
    assert_eq!(
        issues,
        vec![ShapeIssue::EmptyMatchPattern {
            caption: "Customer".into()
        }]
    );
}

#[test]
fn test_filter_field_with_caption_and_calculation() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{
            "filterType": "QUANTITATIVE_NUMERICAL", "quantitativeFilterType": "MAX",
            "field": { "fieldCaption": "Sales", "calculation": "[Sales] * 2" }, "max": 5
        }]
    }));
    assert!(matches!(
        issues.as_slice(),
        [ShapeIssue::CaptionWithCalculation { .. }]
    ));
}

#[test]
fn test_filter_without_field_identity() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{
            "filterType": "QUANTITATIVE_NUMERICAL", "quantitativeFilterType": "ONLY_NULL",
            "field": { "function": "SUM" }
        }]
    }));
    assert_eq!(issues, vec![ShapeIssue::MissingFilterField { index: 0 }]);
}

#[test]
fn test_quantitative_range_with_wrong_bounds_is_malformed() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{
            "filterType": "QUANTITATIVE_NUMERICAL", "quantitativeFilterType": "MIN",
            "field": { "fieldCaption": "Sales" }, "min": 1, "max": 2
        }]
    }));
    assert!(matches!(issues.as_slice(), [ShapeIssue::Malformed { .. }]));
}

#[test]
fn test_invalid_quantitative_date_bound() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{
            "filterType": "QUANTITATIVE_DATE", "quantitativeFilterType": "RANGE",
            "field": { "fieldCaption": "Order Date" }, "minDate": "2024-13-45", "maxDate": "2024-12-31"
        }]
    }));
    assert_eq!(issues.len(), 1);
    let ShapeIssue::InvalidDate { bound, value, .. } = &issues[0] else {
        panic!("Expected InvalidDate, got {:?}", issues[0]);
    };
    assert_eq!(bound, "minDate");
    assert_eq!(value, "2024-13-45");
}

#[test]
fn test_relative_date_range_n_rules() {
    let missing = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{ "filterType": "DATE", "field": { "fieldCaption": "Order Date" },
                      "periodType": "WEEKS", "dateRangeType": "NEXTN" }]
    }));
    assert!(matches!(missing.as_slice(), [ShapeIssue::MissingRangeN { .. }]));

    let unexpected = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{ "filterType": "DATE", "field": { "fieldCaption": "Order Date" },
                      "periodType": "WEEKS", "dateRangeType": "CURRENT", "rangeN": 2 }]
    }));
    assert!(matches!(
        unexpected.as_slice(),
        [ShapeIssue::UnexpectedRangeN { .. }]
    ));
}

#[test]
fn test_relative_date_bad_anchor() {
    let issues = issues_of(json!({
        "fields": [{ "fieldCaption": "Category" }],
        "filters": [{ "filterType": "DATE", "field": { "fieldCaption": "Order Date" },
                      "periodType": "YEARS", "dateRangeType": "TODATE", "anchorDate": "yesterday" }]
    }));
    assert!(matches!(issues.as_slice(), [ShapeIssue::InvalidDate { .. }]));
}

#[test]
fn test_issues_serialize_for_callers() {
    let issues = issues_of(json!({ "fields": [] }));
    let value = serde_json::to_value(&issues).unwrap();
    assert_eq!(value[0]["kind"], "noFields");
}
