//! Paginated, filtered list fetching.
//!
//! A [`ListQuery`] owns a page cursor ([`Pagination`]), a filter map
//! ([`Filters`]) and the result of the latest fetch. Screens change filters
//! or pages and then call [`ListQuery::execute`]; deciding *when* to fetch
//! (immediately, debounced, on pull-to-refresh) stays with the caller.
//!
//! # Ordering
//!
//! Every `execute` call is tagged with a sequence number when it is made.
//! A response is applied only if its tag is still the latest one issued, so
//! a slow response to an old request can never overwrite the result of a
//! newer one. Superseded fetches are not cancelled; their results are
//! dropped when they arrive.

mod filters;
mod pagination;

pub use filters::Filters;
pub use pagination::Pagination;

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::RemoteError;

/// Parameters handed to a [`ListFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Active filters.
    pub filters: Filters,
}

/// One page of results with the server-reported total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

/// Pagination metadata returned alongside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Number of items matching the filters across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            pagination: PageInfo { total },
        }
    }
}

/// Remote list source.
///
/// Any `Fn(PageRequest) -> impl Future<Output = Result<Page<T>, RemoteError>>`
/// closure is a fetcher.
#[async_trait]
pub trait ListFetcher<T>: Send + Sync {
    /// Fetch the page described by `request`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the page cannot be fetched.
    async fn fetch(&self, request: PageRequest) -> Result<Page<T>, RemoteError>;
}

#[async_trait]
impl<T, F, Fut> ListFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, RemoteError>> + Send + 'static,
{
    async fn fetch(&self, request: PageRequest) -> Result<Page<T>, RemoteError> {
        self(request).await
    }
}

/// Lifecycle of the latest fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Observable state of a [`ListQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub pagination: Pagination,
    pub filters: Filters,
    pub status: FetchStatus,
    /// Items of the last applied page. Kept while a new fetch is loading.
    pub items: Vec<T>,
    /// Message of the last applied failure.
    pub error: Option<String>,
}

impl<T> ListState<T> {
    fn new(limit: NonZeroU32) -> Self {
        Self {
            pagination: Pagination::new(limit),
            filters: Filters::new(),
            status: FetchStatus::Idle,
            items: Vec::new(),
            error: None,
        }
    }

    fn request(&self) -> PageRequest {
        PageRequest {
            page: self.pagination.page(),
            limit: self.pagination.limit().get(),
            filters: self.filters.clone(),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }
}

/// What happened to one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The page was applied to the state.
    Applied {
        /// Items on the page.
        items: usize,
        /// Server-reported total.
        total: u64,
    },
    /// The fetch failed and the message was recorded in the state.
    Failed(String),
    /// A newer `execute` was issued before this one resolved; the response
    /// was dropped without touching the state.
    Stale,
}

/// Coordinates page, filters and fetch execution for one list.
pub struct ListQuery<T> {
    fetcher: Arc<dyn ListFetcher<T>>,
    state: watch::Sender<ListState<T>>,
    issued: AtomicU64,
}

impl<T> std::fmt::Debug for ListQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListQuery")
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<T> ListQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle query on page 1 with no filters.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ListFetcher<T>>, limit: NonZeroU32) -> Self {
        Self {
            fetcher,
            state: watch::Sender::new(ListState::new(limit)),
            issued: AtomicU64::new(0),
        }
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.state.borrow().pagination.page()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.state.borrow().pagination.total()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.state.borrow().pagination.total_pages()
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.state.borrow().pagination.has_next()
    }

    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.state.borrow().pagination.has_prev()
    }

    #[must_use]
    pub fn filters(&self) -> Filters {
        self.state.borrow().filters.clone()
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.state.borrow().status
    }

    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Set one filter and return to page 1. Does not fetch.
    pub fn update_filter(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.state.send_modify(|state| {
            state.filters.insert(key, value);
            state.pagination.reset();
        });
    }

    /// Merge several filters and return to page 1. Does not fetch.
    pub fn update_filters<K, V>(&self, values: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let values: Vec<(String, Value)> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.state.send_modify(|state| {
            state.filters.merge(values);
            state.pagination.reset();
        });
    }

    /// Drop one filter and return to page 1. Does not fetch.
    pub fn remove_filter(&self, key: &str) {
        self.state.send_modify(|state| {
            state.filters.remove(key);
            state.pagination.reset();
        });
    }

    /// Drop every filter and return to page 1. Does not fetch.
    pub fn clear_filters(&self) {
        self.state.send_modify(|state| {
            state.filters.clear();
            state.pagination.reset();
        });
    }

    /// Advance one page, clamped to the last known page.
    pub fn next_page(&self) {
        self.state.send_modify(|state| state.pagination.next());
    }

    /// Go back one page, floored at 1.
    pub fn prev_page(&self) {
        self.state.send_modify(|state| state.pagination.prev());
    }

    /// Jump to a page, clamped to the known range.
    pub fn set_page(&self, page: u32) {
        self.state.send_modify(|state| state.pagination.set_page(page));
    }

    /// Change the page size and return to page 1.
    pub fn set_limit(&self, limit: NonZeroU32) {
        self.state.send_modify(|state| state.pagination.set_limit(limit));
    }

    /// Record the server-reported total.
    pub fn set_total(&self, total: u64) {
        self.state.send_modify(|state| state.pagination.set_total(total));
    }

    /// Fetch the current page with the current filters.
    ///
    /// The request is tagged and its parameters captured when this method
    /// is called, not when the returned future is first polled. The state
    /// moves to [`FetchStatus::Loading`] immediately.
    ///
    /// Never fails: errors are recorded in the state and reported through
    /// [`ExecuteOutcome::Failed`].
    pub fn execute(&self) -> impl Future<Output = ExecuteOutcome> + Send + '_ {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let request = self.state.borrow().request();
        self.state.send_modify(|state| {
            state.status = FetchStatus::Loading;
            state.error = None;
        });
        debug!(
            seq,
            page = request.page,
            limit = request.limit,
            "list fetch issued"
        );

        async move {
            let result = self.fetcher.fetch(request).await;
            self.settle(seq, result)
        }
    }

    /// Re-fetch the current page.
    pub fn refresh(&self) -> impl Future<Output = ExecuteOutcome> + Send + '_ {
        self.execute()
    }

    fn settle(&self, seq: u64, result: Result<Page<T>, RemoteError>) -> ExecuteOutcome {
        let mut outcome = ExecuteOutcome::Stale;

        // `execute` issues sequence numbers outside the channel lock, so a
        // newer request may be issued right after this check passes. That
        // request marks the state `Loading` after this update lands, and its
        // result is the only one applied.
        self.state.send_if_modified(|state| {
            let latest = self.issued.load(Ordering::SeqCst);
            if seq != latest {
                debug!(seq, latest, "discarding stale list response");
                return false;
            }

            outcome = match result {
                Ok(page) => {
                    let total = page.pagination.total;
                    let items = page.items.len();
                    state.pagination.set_total(total);
                    state.items = page.items;
                    state.status = FetchStatus::Success;
                    state.error = None;
                    ExecuteOutcome::Applied { items, total }
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(seq, error = %message, "list fetch failed");
                    state.status = FetchStatus::Error;
                    state.error = Some(message.clone());
                    ExecuteOutcome::Failed(message)
                }
            };
            true
        });

        outcome
    }
}
