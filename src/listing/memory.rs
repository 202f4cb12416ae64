//! In-Memory Listing
//!
//! Serves rows held in process with the scan semantics of the hosted store:
//! each call scans at most `limit` stored rows from the cursor offset and
//! returns the ones passing the filter, so post-filter batch sizes vary.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{Cursor, ListingSource, RemoteBatch, ReviewStatusSink};
use crate::domain::{AccessPointItem, Filter, Filterable, RecordKey};
use crate::error::{FetchError, Result};

type RowPredicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Rows that carry a review status
pub trait Reviewable {
    fn key(&self) -> RecordKey;
    fn set_verified(&mut self, verified: bool);
}

impl Reviewable for AccessPointItem {
    fn key(&self) -> RecordKey {
        AccessPointItem::key(self)
    }

    fn set_verified(&mut self, verified: bool) {
        self.verified = Some(verified);
    }
}

/// Listing over rows held in memory
pub struct MemoryListing<T> {
    rows: RwLock<Vec<T>>,
    /// Upper bound on rows scanned per call, below the requested limit
    scan_window: Option<usize>,
    /// Base condition applied on top of the caller's filter
    predicate: Option<RowPredicate<T>>,
    calls: AtomicUsize,
}

impl<T> MemoryListing<T> {
    /// Create a listing over the given rows
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
            scan_window: None,
            predicate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Scan at most `window` rows per call regardless of the requested limit
    pub fn with_scan_window(mut self, window: usize) -> Self {
        self.scan_window = Some(window.max(1));
        self
    }

    /// Only return rows satisfying `predicate`
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Number of listing calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn keep(&self, row: &T, filter: &Filter) -> bool
    where
        T: Filterable,
    {
        self.predicate.as_ref().is_none_or(|p| p(row)) && filter.matches(row)
    }
}

impl MemoryListing<AccessPointItem> {
    /// Listing of access points not yet verified, matching the hosted query
    pub fn unverified_access_points(rows: Vec<AccessPointItem>) -> Self {
        Self::new(rows).with_predicate(|row: &AccessPointItem| !row.is_verified())
    }

    /// Load a JSON array of access points from disk
    pub fn load_fixture(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rows: Vec<AccessPointItem> = serde_json::from_str(&content)?;
        tracing::info!(path = ?path, rows = rows.len(), "Loaded access point fixture");
        Ok(Self::unverified_access_points(rows))
    }
}

fn parse_offset(cursor: Option<&Cursor>) -> Result<usize, FetchError> {
    match cursor {
        None => Ok(0),
        Some(c) => c.as_str().parse().map_err(|_| FetchError::Malformed {
            message: format!("invalid cursor {c:?}"),
        }),
    }
}

impl<T> ListingSource for MemoryListing<T>
where
    T: Filterable + Clone + Send + Sync,
{
    type Item = T;

    async fn list(
        &self,
        filter: &Filter,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<RemoteBatch<T>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if limit == 0 {
            return Err(FetchError::Malformed {
                message: "limit must be positive".to_string(),
            });
        }

        let offset = parse_offset(cursor)?;
        let rows = self.rows.read().await;
        if offset > rows.len() {
            return Err(FetchError::Malformed {
                message: format!("cursor {offset} past end of listing ({})", rows.len()),
            });
        }

        let window = self
            .scan_window
            .map_or(limit as usize, |w| w.min(limit as usize));
        let end = offset.saturating_add(window).min(rows.len());

        let items: Vec<T> = rows[offset..end]
            .iter()
            .filter(|row| self.keep(row, filter))
            .cloned()
            .collect();
        let next_cursor = if end < rows.len() {
            Cursor::new(end.to_string())
        } else {
            None
        };

        tracing::trace!(%filter, offset, end, returned = items.len(), "Memory listing scan");
        Ok(RemoteBatch::new(items, next_cursor))
    }
}

impl<T> ReviewStatusSink for MemoryListing<T>
where
    T: Reviewable + Send + Sync,
{
    async fn set_verified(&self, key: &RecordKey, verified: bool) -> Result<(), FetchError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.key() == *key)
            .ok_or_else(|| FetchError::Unavailable {
                message: format!("no record {key}"),
            })?;
        row.set_verified(verified);
        Ok(())
    }
}
