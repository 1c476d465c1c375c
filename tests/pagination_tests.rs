//! Pagination controller against scripted page sources

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use query_guard::error::{GuardError, RemoteError};
use query_guard::pagination::{paginate, Page, PageConfig, Pagination};

/// Serves `items` in pages of `page_size`, reporting `total` as available
struct PagedSource {
    items: Vec<u32>,
    page_size: usize,
    total: u64,
    requests: Arc<Mutex<Vec<PageConfig>>>,
}

impl PagedSource {
    fn new(items: Vec<u32>, page_size: usize) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            page_size,
            total,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Claim more items than actually exist
    fn overstating(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    fn page(&self, config: PageConfig) -> Result<Page<u32>, RemoteError> {
        self.requests.lock().unwrap().push(config);
        let number = config.page_number.unwrap_or(1);
        let start = (number as usize - 1) * self.page_size;
        let data = self
            .items
            .iter()
            .skip(start)
            .take(self.page_size)
            .copied()
            .collect();
        Ok(Page::new(
            Pagination {
                page_number: number,
                page_size: self.page_size as u64,
                total_available: self.total,
            },
            data,
        ))
    }

    fn requests(&self) -> Vec<PageConfig> {
        self.requests.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_accumulates_all_pages_in_order() {
    let source = PagedSource::new(vec![1, 2, 3, 4, 5], 2);

    let items = paginate(PageConfig::default(), &CancellationToken::new(), |config| {
        let page = source.page(config);
        async move { page }
    })
    .await
    .unwrap();

    assert_eq!(items, vec![1, 2, 3, 4, 5]);
    let pages: Vec<Option<u64>> = source.requests().iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![None, Some(2), Some(3)]);
}

#[tokio::test]
async fn test_limit_stops_early_and_truncates() {
    let source = PagedSource::new((1..=10).collect(), 2);

    let items = paginate(
        PageConfig::default().with_page_size(2).with_limit(3),
        &CancellationToken::new(),
        |config| {
            let page = source.page(config);
            async move { page }
        },
    )
    .await
    .unwrap();

    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn test_limit_above_total_returns_everything() {
    let source = PagedSource::new(vec![7, 8, 9], 2);

    let items = paginate(
        PageConfig::default().with_limit(100),
        &CancellationToken::new(),
        |config| {
            let page = source.page(config);
            async move { page }
        },
    )
    .await
    .unwrap();

    assert_eq!(items, vec![7, 8, 9]);
}

#[tokio::test]
async fn test_starting_page_is_honored() {
    let source = PagedSource::new((1..=6).collect(), 2);

    let err = paginate(
        PageConfig::default().with_page_number(2),
        &CancellationToken::new(),
        |config| {
            let page = source.page(config);
            async move { page }
        },
    )
    .await
    .unwrap_err();

    // totalAvailable counts from page 1, so starting late runs off the end
    let pages: Vec<Option<u64>> = source.requests().iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![Some(2), Some(3), Some(4)]);
    assert!(matches!(
        err,
        GuardError::PaginationExhausted {
            page_number: 3,
            fetched: 4,
            ..
        }
    ));
}

#[tokio::test]
async fn test_overstated_total_is_exhaustion() {
    let source = PagedSource::new(vec![1, 2, 3], 2).overstating(10);

    let err = paginate(PageConfig::default(), &CancellationToken::new(), |config| {
        let page = source.page(config);
        async move { page }
    })
    .await
    .unwrap_err();

    let GuardError::PaginationExhausted {
        page_number,
        total_available,
        fetched,
    } = err
    else {
        panic!("Expected PaginationExhausted, got {:?}", err);
    };
    assert_eq!(page_number, 2);
    assert_eq!(total_available, 10);
    assert_eq!(fetched, 3);
}

#[tokio::test]
async fn test_remote_failure_mid_way_discards_partial_result() {
    let mut calls = 0;
    let result: Result<Vec<u32>, GuardError> =
        paginate(PageConfig::default(), &CancellationToken::new(), |_| {
            calls += 1;
            let response = if calls == 1 {
                Ok(Page::new(
                    Pagination {
                        page_number: 1,
                        page_size: 1,
                        total_available: 2,
                    },
                    vec![1],
                ))
            } else {
                Err(RemoteError::with_status(500, "boom"))
            };
            async move { response }
        })
        .await;

    assert!(matches!(result, Err(GuardError::Remote(_))));
}

#[tokio::test]
async fn test_cancel_between_pages() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let source = PagedSource::new((1..=6).collect(), 2);

    let result = paginate(PageConfig::default(), &cancel, |config| {
        let page = source.page(config);
        // cancel once the first page is in hand
        trigger.cancel();
        async move { page }
    })
    .await;

    assert!(matches!(result, Err(GuardError::Cancelled)));
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test]
async fn test_zero_limit_rejected_before_fetching() {
    let source = PagedSource::new(vec![1], 1);

    let result = paginate(
        PageConfig::default().with_limit(0),
        &CancellationToken::new(),
        |config| {
            let page = source.page(config);
            async move { page }
        },
    )
    .await;

    assert!(matches!(result, Err(GuardError::InvalidPageConfig { .. })));
    assert!(source.requests().is_empty());
}
