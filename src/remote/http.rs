//! HTTP executor for the remote query endpoint
//!
//! POSTs the JSON request body and decodes the JSON row set. Non-2xx answers
//! become a [`RemoteError`] carrying the status and response text.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::QueryExecutor;
use crate::config::ServerConfig;
use crate::error::{GuardError, RemoteError, Result};
use crate::query::{QueryOutput, QueryRequest};

/// Longest response body echoed back in an error
const MAX_ERROR_BODY: usize = 500;

pub struct HttpQueryExecutor {
    client: Client,
    endpoint: Url,
    auth_header: String,
    api_token: Option<String>,
}

impl HttpQueryExecutor {
    /// Build from server settings; fails when the URL is missing or invalid
    pub fn from_config(server: &ServerConfig) -> Result<Self> {
        Self::new(server.server_url()?, &server.query_path)
            .map(|executor| executor.with_auth(&server.auth_header, server.api_token.clone()))
    }

    pub fn new(base_url: &str, query_path: &str) -> Result<Self> {
        let endpoint = join_endpoint(base_url, query_path)?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            auth_header: "X-Auth-Token".to_string(),
            api_token: None,
        })
    }

    pub fn with_auth(mut self, header: &str, token: Option<String>) -> Self {
        self.auth_header = header.to_string();
        self.api_token = token;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn join_endpoint(base_url: &str, query_path: &str) -> Result<Url> {
    let invalid = |e: url::ParseError| GuardError::ConfigError {
        reason: format!("Invalid server URL '{}': {}", base_url, e),
    };
    // Without a trailing slash Url::join would drop the last base segment
    let base = if base_url.ends_with('/') {
        Url::parse(base_url).map_err(invalid)?
    } else {
        Url::parse(&format!("{}/", base_url)).map_err(invalid)?
    };
    base.join(query_path.trim_start_matches('/')).map_err(invalid)
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    fn name(&self) -> &str {
        "http"
    }

    async fn execute_query(
        &self,
        request: &QueryRequest,
    ) -> std::result::Result<QueryOutput, RemoteError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.api_token {
            builder = builder.header(self.auth_header.as_str(), token);
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            datasource = %request.datasource.datasource_luid,
            fields = request.query.fields.len(),
            "Posting query"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::new(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(RemoteError::with_status(status.as_u16(), body));
        }

        response
            .json::<QueryOutput>()
            .await
            .map_err(|e| RemoteError::new(format!("invalid response body: {}", e)))
    }
}
