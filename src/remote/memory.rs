//! In-memory executor
//!
//! Answers single-field queries from a `caption -> values` table, which is all
//! the filter value corrector ever asks for. Used by tests and by the CLI's
//! offline `--values` mode.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::QueryExecutor;
use crate::error::RemoteError;
use crate::query::{QueryOutput, QueryRequest};

#[derive(Clone, Default)]
pub struct StaticQueryExecutor {
    columns: HashMap<String, Vec<Value>>,
    /// Returned for queries that are not a single known field
    fallback_rows: Vec<Map<String, Value>>,
    /// Captions whose lookups fail with a remote error
    failing: Vec<String>,
    requests: Arc<Mutex<Vec<QueryRequest>>>,
}

impl StaticQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `{caption: [values]}` JSON object
    pub fn from_json(value: &Value) -> Result<Self, RemoteError> {
        let Value::Object(map) = value else {
            return Err(RemoteError::new("value fixture must be a JSON object"));
        };
        let mut executor = Self::new();
        for (caption, values) in map {
            let Value::Array(values) = values else {
                return Err(RemoteError::new(format!(
                    "values for '{}' must be an array",
                    caption
                )));
            };
            executor.columns.insert(caption.clone(), values.clone());
        }
        Ok(executor)
    }

    pub fn with_column<I, V>(mut self, caption: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns
            .insert(caption.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fallback_rows(mut self, rows: Vec<Map<String, Value>>) -> Self {
        self.fallback_rows = rows;
        self
    }

    /// Make lookups of `caption` fail
    pub fn failing_on(mut self, caption: impl Into<String>) -> Self {
        self.failing.push(caption.into());
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.lock_requests().clone()
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<QueryRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl QueryExecutor for StaticQueryExecutor {
    fn name(&self) -> &str {
        "static"
    }

    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryOutput, RemoteError> {
        self.lock_requests().push(request.clone());

        let caption = match request.query.fields.as_slice() {
            [only] => only.field_caption.as_str(),
            _ => return Ok(QueryOutput::from_rows(self.fallback_rows.clone())),
        };

        if self.failing.iter().any(|c| c == caption) {
            return Err(RemoteError::with_status(
                500,
                format!("lookup of '{}' failed", caption),
            ));
        }

        let limit = request
            .options
            .as_ref()
            .and_then(|o| o.row_limit)
            .map(|n| n as usize)
            .unwrap_or(usize::MAX);

        let rows = self
            .columns
            .get(caption)
            .map(|values| {
                values
                    .iter()
                    .take(limit)
                    .map(|v| {
                        let mut row = Map::new();
                        row.insert(caption.to_string(), v.clone());
                        row
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(QueryOutput::from_rows(rows))
    }
}
