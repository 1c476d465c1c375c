//! Query field types
//!
//! - `Field`: a column requested by the query
//! - `FilterField`: the column a filter constrains

use serde::{Deserialize, Serialize};

/// Aggregation or date function applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Function {
    Sum,
    Avg,
    Median,
    Count,
    Countd,
    Min,
    Max,
    Stdev,
    Var,
    Collect,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    TruncYear,
    TruncQuarter,
    TruncMonth,
    TruncWeek,
    TruncDay,
    Agg,
    None,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A field requested by the query.
///
/// A plain dimension carries only `field_caption`; a measure adds `function`;
/// a calculated field adds `calculation`. `function` and `calculation` are
/// mutually exclusive, which the shape validator enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<Function>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_decimal_places: Option<i64>,
}

impl Field {
    /// Plain dimension field
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            field_caption: caption.into(),
            function: None,
            calculation: None,
            alias: None,
            sort_direction: None,
            sort_priority: None,
            max_decimal_places: None,
        }
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.function = Some(function);
        self
    }

    pub fn with_calculation(mut self, calculation: impl Into<String>) -> Self {
        self.calculation = Some(calculation.into());
        self
    }

    pub fn with_sort(mut self, direction: SortDirection, priority: i64) -> Self {
        self.sort_direction = Some(direction);
        self.sort_priority = Some(priority);
        self
    }

    pub fn with_max_decimal_places(mut self, places: i64) -> Self {
        self.max_decimal_places = Some(places);
        self
    }
}

/// The field a filter applies to.
///
/// Either a caption (optionally with a function) or a bare calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<Function>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
}

impl FilterField {
    pub fn caption(caption: impl Into<String>) -> Self {
        Self {
            field_caption: Some(caption.into()),
            ..Default::default()
        }
    }

    pub fn calculation(calculation: impl Into<String>) -> Self {
        Self {
            calculation: Some(calculation.into()),
            ..Default::default()
        }
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.function = Some(function);
        self
    }

    /// Caption when present and non-empty
    pub fn caption_str(&self) -> Option<&str> {
        self.field_caption.as_deref().filter(|c| !c.is_empty())
    }

    /// Caption only, no function or calculation
    pub fn is_plain(&self) -> bool {
        self.function.is_none() && self.calculation.is_none()
    }

    /// Human-readable label for error messages
    pub fn label(&self) -> &str {
        self.field_caption
            .as_deref()
            .or(self.calculation.as_deref())
            .unwrap_or("<unnamed>")
    }
}
