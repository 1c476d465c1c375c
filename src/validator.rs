//! Query Validation Orchestrator
//!
//! Runs both validation layers in front of the real query:
//!
//! 1. Shape (pure, always runs)
//! 2. Filter values against live data (skipped when disabled in config)
//!
//! [`QueryValidator::execute_checked`] adds the real call and result capping.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::GuardConfig;
use crate::corrector::{CorrectionOptions, CorrectionReport, FilterValueCorrector};
use crate::error::{GuardError, Result};
use crate::query::{DatasourceRef, QueryOptions, QueryOutput, QueryRequest};
use crate::remote::QueryExecutor;
use crate::validators::{parse_query_value, validate_shape};

pub struct QueryValidator {
    config: GuardConfig,
    executor: Arc<dyn QueryExecutor>,
}

impl QueryValidator {
    pub fn new(config: GuardConfig, executor: Arc<dyn QueryExecutor>) -> Self {
        Self { config, executor }
    }

    /// Run both layers and return the full report.
    ///
    /// Shape problems fail immediately with [`GuardError::Structural`]; bad
    /// filter values are left in the report for the caller to inspect.
    pub async fn check(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<CorrectionReport> {
        // Layer 1: Shape
        validate_shape(&request.query)?;

        // Layer 2: Filter values
        if !self.config.validation.filter_validation {
            tracing::debug!("Filter value validation disabled, skipping");
            return Ok(CorrectionReport::default());
        }

        FilterValueCorrector::new(self.executor.as_ref(), &request.datasource)
            .with_options(CorrectionOptions::from(&self.config.validation))
            .check(&request.query, cancel)
            .await
    }

    /// Validate a request; any problem is an error
    pub async fn validate(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.check(request, cancel).await?.into_result()
    }

    /// Validate, then run the real query and cap the returned rows
    pub async fn execute_checked(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<QueryOutput> {
        self.validate(request, cancel).await?;

        if cancel.is_cancelled() {
            return Err(GuardError::Cancelled);
        }

        tracing::info!(
            executor = self.executor.name(),
            datasource = %request.datasource.datasource_luid,
            "Executing validated query"
        );
        let mut output = self.executor.execute_query(request).await?;

        if let Some(limit) = self.config.results.max_result_limit {
            if output.data.len() > limit {
                tracing::info!(
                    returned = output.data.len(),
                    limit,
                    "Truncating result to max_result_limit"
                );
                output.data.truncate(limit);
            }
        }

        Ok(output)
    }
}

/// Read a JSON or YAML document (by extension) into a JSON value
pub fn load_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {:?}", path))?;

    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))
    }
}

/// Read a request file, JSON or YAML by extension.
///
/// A malformed `query` member is a [`GuardError::Structural`], the same as
/// any other shape problem.
pub fn load_request(path: &Path) -> anyhow::Result<QueryRequest> {
    let serde_json::Value::Object(mut document) = load_document(path)? else {
        anyhow::bail!("Request in {:?} must be an object", path);
    };

    let query = document
        .remove("query")
        .with_context(|| format!("Request in {:?} has no query", path))?;
    let query = parse_query_value(query).map_err(GuardError::from)?;

    let datasource = document
        .remove("datasource")
        .with_context(|| format!("Request in {:?} has no datasource", path))?;
    let datasource: DatasourceRef = serde_json::from_value(datasource)
        .with_context(|| format!("Invalid datasource in {:?}", path))?;

    let options: Option<QueryOptions> = match document.remove("options") {
        Some(serde_json::Value::Null) | None => None,
        Some(options) => Some(
            serde_json::from_value(options)
                .with_context(|| format!("Invalid options in {:?}", path))?,
        ),
    };

    Ok(QueryRequest {
        datasource,
        query,
        options,
    })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{DatasourceRef, Field, Filter, FilterField, Query, SetFilter};
    use crate::remote::StaticQueryExecutor;
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn rows(n: usize) -> Vec<Map<String, serde_json::Value>> {
        (0..n)
            .map(|i| {
                let mut row = Map::new();
                row.insert("Sales".into(), json!(i));
                row
            })
            .collect()
    }

    fn executor() -> StaticQueryExecutor {
        StaticQueryExecutor::new()
            .with_column("Region", ["East", "West"])
            .with_fallback_rows(rows(10))
    }

    fn request(region: &str) -> QueryRequest {
        QueryRequest::new(
            DatasourceRef::new("ds-1"),
            Query::new(vec![Field::new("Region"), Field::new("Sales")]).with_filter(Filter::Set(
                SetFilter::new(FilterField::caption("Region"), [region]),
            )),
        )
    }

    fn make_validator(config: GuardConfig, executor: &StaticQueryExecutor) -> QueryValidator {
        QueryValidator::new(config, Arc::new(executor.clone()))
    }

    #[tokio::test]
    async fn test_valid_request_passes() {
        let validator = make_validator(GuardConfig::default(), &executor());
        let report = validator
            .check(&request("East"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn test_shape_failure_skips_remote() {
        let executor = executor();
        let validator = make_validator(GuardConfig::default(), &executor);
        let bad = QueryRequest::new(DatasourceRef::new("ds-1"), Query::new(vec![]));
        let err = validator
            .validate(&bad, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Structural(_)));
        assert!(executor.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bad_filter_value_fails_validate() {
        let validator = make_validator(GuardConfig::default(), &executor());
        let err = validator
            .validate(&request("Wast"), &CancellationToken::new())
            .await
            .unwrap_err();
        let errors = err.filter_errors().unwrap();
        assert_eq!(errors[0].field, "Region");
    }

    #[tokio::test]
    async fn test_filter_validation_toggle() {
        let executor = executor();
        let mut config = GuardConfig::default();
        config.validation.filter_validation = false;
        let validator = make_validator(config, &executor);
        validator
            .validate(&request("Wast"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(executor.requests().is_empty());
    }

    #[tokio::test]
    async fn test_execute_checked_truncates() {
        let executor = executor();
        let mut config = GuardConfig::default();
        config.results.max_result_limit = Some(3);
        let validator = make_validator(config, &executor);
        let output = validator
            .execute_checked(&request("East"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.data.len(), 3);
        // one lookup plus the real query
        assert_eq!(executor.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_checked_does_not_run_invalid_query() {
        let executor = executor();
        let validator = make_validator(GuardConfig::default(), &executor);
        assert!(validator
            .execute_checked(&request("Wast"), &CancellationToken::new())
            .await
            .is_err());
        assert_eq!(executor.requests().len(), 1);
    }

    #[test]
    fn test_load_request_json_and_yaml() {
        let temp_dir = TempDir::new().unwrap();

        let json_path = temp_dir.path().join("request.json");
        std::fs::write(
            &json_path,
            r#"{"datasource": {"datasourceLuid": "ds"}, "query": {"fields": [{"fieldCaption": "A"}]}}"#,
        )
        .unwrap();
        let request = load_request(&json_path).unwrap();
        assert_eq!(request.datasource.datasource_luid, "ds");

        let yaml_path = temp_dir.path().join("request.yml");
        std::fs::write(
            &yaml_path,
            "datasource:\n  datasourceLuid: ds\nquery:\n  fields:\n    - fieldCaption: A\n",
        )
        .unwrap();
        let request = load_request(&yaml_path).unwrap();
        assert_eq!(request.query.fields[0].field_caption, "A");
    }

    #[test]
    fn test_load_request_malformed_query_is_structural() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"datasource": {"datasourceLuid": "ds"},
                "query": {"fields": [{"fieldCaption": "A"}],
                          "filters": [{"filterType": "FUZZY", "field": {"fieldCaption": "A"}}]}}"#,
        )
        .unwrap();

        let err = load_request(&path).unwrap_err();
        let guard = err.downcast_ref::<GuardError>().unwrap();
        assert_eq!(guard.code(), "QG-001");
        assert!(matches!(guard, GuardError::Structural(_)));
    }

    #[test]
    fn test_load_request_without_datasource() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.json");
        std::fs::write(&path, r#"{"query": {"fields": [{"fieldCaption": "A"}]}}"#).unwrap();

        let err = load_request(&path).unwrap_err();
        assert!(err.to_string().contains("has no datasource"));
    }

    #[test]
    fn test_load_request_missing_file() {
        let err = load_request(Path::new("/nonexistent/request.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }
}
