//! # Remote Query Capability
//!
//! The read-only query capability the validation pipeline depends on.
//!
//! - [`QueryExecutor`] - Core trait for running a query against a datasource
//! - [`HttpQueryExecutor`] - Production executor posting to the query endpoint
//! - [`StaticQueryExecutor`] - In-memory executor for tests and offline checks
//!
//! Credentials, request logging and retries belong to whoever constructs the
//! executor; implementations here only map a request to rows or a
//! [`RemoteError`].

mod http;
mod memory;

pub use http::HttpQueryExecutor;
pub use memory::StaticQueryExecutor;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::query::{QueryOutput, QueryRequest};

/// Read-only access to the remote analytical data service
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Run a query and return its rows
    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryOutput, RemoteError>;
}
