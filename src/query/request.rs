//! Request and response envelopes for the remote query endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Query;

/// Identifies the datasource a query runs against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceRef {
    pub datasource_luid: String,
}

impl DatasourceRef {
    pub fn new(luid: impl Into<String>) -> Self {
        Self {
            datasource_luid: luid.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnFormat {
    #[default]
    Objects,
    Arrays,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default)]
    pub return_format: ReturnFormat,
    #[serde(default)]
    pub disaggregate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u64>,
}

/// Body sent to the remote query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub datasource: DatasourceRef,
    pub query: Query,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<QueryOptions>,
}

impl QueryRequest {
    pub fn new(datasource: DatasourceRef, query: Query) -> Self {
        Self {
            datasource,
            query,
            options: None,
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Rows returned by the remote, one JSON object per row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
}

impl QueryOutput {
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        Self { data: rows }
    }

    /// String-coerced values of `caption` across all rows, nulls skipped
    pub fn column_values(&self, caption: &str) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|row| row.get(caption))
            .filter_map(coerce_to_string)
            .collect()
    }

    /// String-coerced values of `caption`, nulls kept as `"null"`
    pub fn column_values_with_nulls(&self, caption: &str) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|row| row.get(caption))
            .map(coerce_or_null)
            .collect()
    }
}

/// Coerce a JSON scalar to the string form used for value comparison.
///
/// Strings are taken verbatim; other values use their JSON text. Null has no
/// string form.
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Like [`coerce_to_string`], with null spelled `"null"`
pub fn coerce_or_null(value: &Value) -> String {
    coerce_to_string(value).unwrap_or_else(|| Value::Null.to_string())
}
