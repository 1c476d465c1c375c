//! Filter types
//!
//! `Filter` is internally tagged on `filterType`. The two quantitative
//! variants nest a second enum tagged on `quantitativeFilterType`, where each
//! sub-variant declares exactly its own bounds and rejects anything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::FilterField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filterType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Filter {
    Set(SetFilter),
    Match(MatchFilter),
    Top(TopFilter),
    QuantitativeNumerical(QuantitativeNumericalFilter),
    QuantitativeDate(QuantitativeDateFilter),
    Date(RelativeDateFilter),
}

impl Filter {
    /// The field this filter constrains
    pub fn field(&self) -> &FilterField {
        match self {
            Filter::Set(f) => &f.field,
            Filter::Match(f) => &f.field,
            Filter::Top(f) => &f.field,
            Filter::QuantitativeNumerical(f) => f.field(),
            Filter::QuantitativeDate(f) => f.field(),
            Filter::Date(f) => &f.field,
        }
    }

    /// Wire name of the filter type
    pub fn type_name(&self) -> &'static str {
        match self {
            Filter::Set(_) => "SET",
            Filter::Match(_) => "MATCH",
            Filter::Top(_) => "TOP",
            Filter::QuantitativeNumerical(_) => "QUANTITATIVE_NUMERICAL",
            Filter::QuantitativeDate(_) => "QUANTITATIVE_DATE",
            Filter::Date(_) => "DATE",
        }
    }
}

/// Keep (or exclude) rows whose value is in `values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFilter {
    pub field: FilterField,
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<bool>,
}

impl SetFilter {
    pub fn new<I, S>(field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        Self {
            field,
            values: values.into_iter().map(Into::into).collect(),
            exclude: None,
        }
    }
}

/// Keep rows whose value matches the given string patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilter {
    pub field: FilterField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<bool>,
}

impl MatchFilter {
    pub fn has_pattern(&self) -> bool {
        self.starts_with.is_some() || self.ends_with.is_some() || self.contains.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopDirection {
    #[default]
    Top,
    Bottom,
}

/// Keep the top (or bottom) N members of `field` ranked by `field_to_measure`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopFilter {
    pub field: FilterField,
    pub how_many: u32,
    pub field_to_measure: FilterField,
    #[serde(default)]
    pub direction: TopDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "quantitativeFilterType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase",
    deny_unknown_fields
)]
pub enum QuantitativeNumericalFilter {
    Range {
        field: FilterField,
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    Min {
        field: FilterField,
        min: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    Max {
        field: FilterField,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    OnlyNull {
        field: FilterField,
    },
    OnlyNonNull {
        field: FilterField,
    },
}

impl QuantitativeNumericalFilter {
    pub fn field(&self) -> &FilterField {
        match self {
            Self::Range { field, .. }
            | Self::Min { field, .. }
            | Self::Max { field, .. }
            | Self::OnlyNull { field }
            | Self::OnlyNonNull { field } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "quantitativeFilterType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase",
    deny_unknown_fields
)]
pub enum QuantitativeDateFilter {
    Range {
        field: FilterField,
        min_date: String,
        max_date: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    Min {
        field: FilterField,
        min_date: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    Max {
        field: FilterField,
        max_date: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_nulls: Option<bool>,
    },
    OnlyNull {
        field: FilterField,
    },
    OnlyNonNull {
        field: FilterField,
    },
}

impl QuantitativeDateFilter {
    pub fn field(&self) -> &FilterField {
        match self {
            Self::Range { field, .. }
            | Self::Min { field, .. }
            | Self::Max { field, .. }
            | Self::OnlyNull { field }
            | Self::OnlyNonNull { field } => field,
        }
    }

    /// Date bounds present on this variant, as (wire name, value)
    pub fn bounds(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Range {
                min_date, max_date, ..
            } => vec![("minDate", min_date), ("maxDate", max_date)],
            Self::Min { min_date, .. } => vec![("minDate", min_date)],
            Self::Max { max_date, .. } => vec![("maxDate", max_date)],
            Self::OnlyNull { .. } | Self::OnlyNonNull { .. } => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Quarters,
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRangeType {
    #[serde(rename = "CURRENT")]
    Current,
    #[serde(rename = "LAST")]
    Last,
    #[serde(rename = "NEXT")]
    Next,
    #[serde(rename = "TODATE")]
    ToDate,
    #[serde(rename = "LASTN")]
    LastN,
    #[serde(rename = "NEXTN")]
    NextN,
}

impl DateRangeType {
    /// LASTN and NEXTN need a `rangeN`
    pub fn takes_range_n(self) -> bool {
        matches!(self, DateRangeType::LastN | DateRangeType::NextN)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DateRangeType::Current => "CURRENT",
            DateRangeType::Last => "LAST",
            DateRangeType::Next => "NEXT",
            DateRangeType::ToDate => "TODATE",
            DateRangeType::LastN => "LASTN",
            DateRangeType::NextN => "NEXTN",
        }
    }
}

/// Relative date filter, e.g. "last 3 months"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeDateFilter {
    pub field: FilterField,
    pub period_type: PeriodType,
    pub date_range_type: DateRangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_n: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_nulls: Option<bool>,
}
