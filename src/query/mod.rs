//! Query data model
//!
//! Wire-compatible Rust types for the remote query API:
//! - [`Query`]: fields plus optional filters
//! - [`Field`] / [`FilterField`]: column references
//! - [`Filter`]: tagged union of the six filter kinds
//! - [`QueryRequest`] / [`QueryOutput`]: request and response envelopes

mod field;
mod filter;
mod request;

pub use field::{Field, FilterField, Function, SortDirection};
pub use filter::{
    DateRangeType, Filter, MatchFilter, PeriodType, QuantitativeDateFilter,
    QuantitativeNumericalFilter, RelativeDateFilter, SetFilter, TopDirection, TopFilter,
};
pub use request::{
    coerce_or_null, coerce_to_string, DatasourceRef, QueryOptions, QueryOutput, QueryRequest,
    ReturnFormat,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Single-dimension query returning the distinct values of `caption`
    pub fn distinct_values_of(caption: impl Into<String>) -> Self {
        Self::new(vec![Field::new(caption)])
    }
}
