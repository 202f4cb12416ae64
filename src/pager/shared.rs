//! Shared Paginator Handle
//!
//! A cloneable handle that lets several tasks reach one paginator while
//! keeping at most one page load in flight. A second concurrent load is
//! rejected with [`Error::Busy`] instead of racing on the buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{LoadOutcome, LookAheadPaginator};
use crate::domain::Filter;
use crate::error::{Error, Result};
use crate::listing::ListingSource;

/// Consistent copy of a paginator's readable state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerSnapshot<R> {
    pub records: Vec<R>,
    pub ready_page: usize,
    pub page_size: usize,
    pub exhausted: bool,
}

impl<R> PagerSnapshot<R> {
    /// Buffered rows of page `page`, possibly short or empty
    pub fn page(&self, page: usize) -> &[R] {
        let start = page.saturating_mul(self.page_size).min(self.records.len());
        let end = start.saturating_add(self.page_size).min(self.records.len());
        &self.records[start..end]
    }
}

/// Clears the in-flight flag when a load finishes or its future is dropped
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Thread-safe handle to one paginator
pub struct SharedPaginator<S, R>
where
    S: ListingSource,
{
    inner: Arc<Mutex<LookAheadPaginator<S, R>>>,
    /// Set only while a page load runs; snapshots do not touch it
    loading: Arc<AtomicBool>,
    filter: Filter,
}

impl<S, R> Clone for SharedPaginator<S, R>
where
    S: ListingSource,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            loading: self.loading.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<S, R> SharedPaginator<S, R>
where
    S: ListingSource,
    R: From<S::Item> + Clone,
{
    pub fn new(pager: LookAheadPaginator<S, R>) -> Self {
        let filter = pager.filter().clone();
        Self {
            inner: Arc::new(Mutex::new(pager)),
            loading: Arc::new(AtomicBool::new(false)),
            filter,
        }
    }

    /// Load the pending page, or fail with `Busy` if a load is in flight
    pub async fn ensure_page_loaded(&self, page: usize) -> Result<LoadOutcome> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::debug!(page, filter = %self.filter, "Rejecting concurrent page load");
                Error::Busy {
                    message: format!("a page load is already in flight for filter {}", self.filter),
                }
            })?;
        let _guard = LoadGuard(&self.loading);

        // Only a snapshot can hold the lock here, and it releases it promptly
        let mut pager = self.inner.lock().await;
        pager.ensure_page_loaded(page).await
    }

    /// Check if a page load is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Wait for any in-flight load and copy the readable state
    pub async fn snapshot(&self) -> PagerSnapshot<R> {
        let pager = self.inner.lock().await;
        PagerSnapshot {
            records: pager.records().to_vec(),
            ready_page: pager.ready_page(),
            page_size: pager.page_size(),
            exhausted: pager.is_exhausted(),
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}
