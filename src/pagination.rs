//! Pagination controller
//!
//! Accumulates items from a page-oriented source until the remote's reported
//! `totalAvailable` (or the caller's `limit`) is reached.
//!
//! # Example
//!
//! ```rust,ignore
//! use query_guard::pagination::{paginate, PageConfig};
//!
//! let items = paginate(PageConfig::default().with_limit(50), &cancel, |config| async move {
//!     client.list_items(config).await
//! })
//! .await?;
//! ```

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{GuardError, RemoteError};

/// Page request parameters, each a positive integer when present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    /// Total items wanted across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl PageConfig {
    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_page_number(mut self, number: u64) -> Self {
        self.page_number = Some(number);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), GuardError> {
        for (name, value) in [
            ("pageSize", self.page_size),
            ("pageNumber", self.page_number),
            ("limit", self.limit),
        ] {
            if value == Some(0) {
                return Err(GuardError::InvalidPageConfig {
                    reason: format!("{} must be a positive integer", name),
                });
            }
        }
        Ok(())
    }
}

/// Pagination block reported by the remote alongside each page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: u64,
    pub page_size: u64,
    pub total_available: u64,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(pagination: Pagination, data: Vec<T>) -> Self {
        Self { pagination, data }
    }
}

/// Fetch pages until `totalAvailable` or `limit` items are accumulated.
///
/// The first request uses `config` as given; follow-ups ask for the next page
/// number with the same `pageSize` and `limit`. A follow-up page that comes
/// back empty while the remote still claims more data fails with
/// [`GuardError::PaginationExhausted`]. The result keeps cross-page order and
/// is truncated to `limit` when one is set.
pub async fn paginate<T, F, Fut>(
    config: PageConfig,
    cancel: &CancellationToken,
    mut get_page: F,
) -> Result<Vec<T>, GuardError>
where
    F: FnMut(PageConfig) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteError>>,
{
    config.validate()?;

    if cancel.is_cancelled() {
        return Err(GuardError::Cancelled);
    }
    let first = get_page(config).await?;
    let mut page_number = first.pagination.page_number;
    let mut total_available = first.pagination.total_available;
    let mut items = first.data;

    tracing::debug!(
        page = page_number,
        fetched = items.len(),
        total_available,
        "Fetched first page"
    );

    while total_available > items.len() as u64
        && config.limit.map_or(true, |limit| limit > items.len() as u64)
    {
        if cancel.is_cancelled() {
            return Err(GuardError::Cancelled);
        }

        let next = get_page(PageConfig {
            page_size: config.page_size,
            page_number: Some(page_number + 1),
            limit: config.limit,
        })
        .await?;

        if next.data.is_empty() {
            tracing::warn!(
                page = page_number,
                total_available,
                fetched = items.len(),
                "Remote reported more data than it returned"
            );
            return Err(GuardError::PaginationExhausted {
                page_number,
                total_available,
                fetched: items.len(),
            });
        }

        page_number = next.pagination.page_number;
        total_available = next.pagination.total_available;
        items.extend(next.data);

        tracing::debug!(
            page = page_number,
            fetched = items.len(),
            total_available,
            "Fetched page"
        );
    }

    if let Some(limit) = config.limit {
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    Ok(items)
}
