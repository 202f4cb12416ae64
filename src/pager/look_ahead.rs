//! Look-Ahead Paginator
//!
//! Presents fixed-size pages over a cursor-based listing whose per-call batch
//! size is unrelated to the page size and whose filter selectivity is unknown.
//!
//! ## Lookahead rule
//!
//! Records fetched toward the pending page are counted as `found`. The
//! pending page becomes ready once `found > page_size` and
//! `found % page_size != 0`: the buffer then holds strictly more than a whole
//! number of pages, which proves data exists past the page boundary. An exact
//! multiple is ambiguous (the listing may end right there), so another batch
//! is fetched.
//!
//! ```text
//! ensure_page_loaded(ready_page)
//!       │
//!       ▼
//! list(filter, limit, frontier) ──► append batch, advance frontier
//!       │
//!       ├── boundary crossed ──► ready_page += 1, stop
//!       ├── no cursor        ──► frontier = Exhausted, stop
//!       └── otherwise        ──► fetch again
//! ```

use snafu::ResultExt;
use std::fmt;
use tracing::{debug, info};

use crate::domain::{Filter, PagerConfig};
use crate::error::{RemoteFetchSnafu, Result};
use crate::listing::{Cursor, ListingSource};

/// Position of the paginator in the remote listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Frontier {
    /// Nothing fetched yet
    #[default]
    Start,
    /// More data may exist after this cursor
    At(Cursor),
    /// The listing reported no further data, ever
    Exhausted,
}

impl Frontier {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::At(cursor) => Some(cursor),
            Self::Start | Self::Exhausted => None,
        }
    }

    fn after(next_cursor: Option<Cursor>) -> Self {
        next_cursor.map_or(Self::Exhausted, Self::At)
    }
}

/// What a call to [`LookAheadPaginator::ensure_page_loaded`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The requested page is not the pending page; nothing fetched
    Skipped,
    /// The pending page became ready
    Advanced { ready_page: usize },
    /// The listing ran out before the page boundary was crossed
    Exhausted { ready_page: usize },
    /// The listing was already exhausted; nothing fetched
    AlreadyExhausted,
}

/// Check whether `found` records prove data past a page boundary
fn crosses_lookahead(found: usize, page_size: usize) -> bool {
    found > page_size && found % page_size != 0
}

/// Fixed-size page view over a filtered cursor listing
///
/// One instance serves one filter for its whole lifetime. Raw items are
/// mapped 1:1 into `R` as they are buffered.
pub struct LookAheadPaginator<S, R>
where
    S: ListingSource,
{
    source: S,
    filter: Filter,
    page_size: usize,
    batch_limit: u32,
    records: Vec<R>,
    frontier: Frontier,
    ready_page: usize,
    /// Buffer length when `ready_page` last advanced
    page_start: usize,
}

impl<S, R> LookAheadPaginator<S, R>
where
    S: ListingSource,
    R: From<S::Item>,
{
    /// Create a paginator for `filter`
    pub fn new(source: S, filter: Filter, config: PagerConfig) -> Result<Self> {
        config.validate()?;
        debug!(%filter, page_size = config.page_size, "Creating paginator");
        Ok(Self {
            source,
            filter,
            page_size: config.page_size,
            batch_limit: config.batch_limit,
            records: Vec::new(),
            frontier: Frontier::Start,
            ready_page: 0,
            page_start: 0,
        })
    }

    /// Make sure the pending page is backed by buffered records.
    ///
    /// Only `requested_page == ready_page()` fetches anything; other pages are
    /// ignored. A failed fetch appends nothing from the failing batch, and
    /// batches already received stay committed, so retrying the same call
    /// resumes from the last confirmed cursor. Dropping the returned future
    /// has the same effect as a failure.
    pub async fn ensure_page_loaded(&mut self, requested_page: usize) -> Result<LoadOutcome> {
        if requested_page != self.ready_page {
            debug!(requested_page, ready_page = self.ready_page, "Page request ignored");
            return Ok(LoadOutcome::Skipped);
        }
        if self.frontier.is_exhausted() {
            return Ok(LoadOutcome::AlreadyExhausted);
        }

        loop {
            let batch = self
                .source
                .list(&self.filter, self.batch_limit, self.frontier.cursor())
                .await
                .context(RemoteFetchSnafu {
                    page: requested_page,
                })?;

            let fetched = batch.items.len();
            self.records.extend(batch.items.into_iter().map(R::from));
            self.frontier = Frontier::after(batch.next_cursor);
            let found = self.records.len() - self.page_start;
            debug!(requested_page, fetched, found, "Batch buffered");

            if crosses_lookahead(found, self.page_size) {
                self.ready_page = requested_page + 1;
                self.page_start = self.records.len();
                debug!(ready_page = self.ready_page, buffered = self.records.len(), "Page ready");
                return Ok(LoadOutcome::Advanced {
                    ready_page: self.ready_page,
                });
            }

            if self.frontier.is_exhausted() {
                info!(
                    filter = %self.filter,
                    ready_page = self.ready_page,
                    buffered = self.records.len(),
                    "Listing exhausted"
                );
                return Ok(LoadOutcome::Exhausted {
                    ready_page: self.ready_page,
                });
            }
        }
    }
}

impl<S, R> LookAheadPaginator<S, R>
where
    S: ListingSource,
{
    /// Buffered records in listing order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Pending page index; every page below it is fully buffered
    pub fn ready_page(&self) -> usize {
        self.ready_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Check if the listing has no more data
    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_exhausted()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, R> fmt::Debug for LookAheadPaginator<S, R>
where
    S: ListingSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookAheadPaginator")
            .field("filter", &self.filter)
            .field("page_size", &self.page_size)
            .field("buffered", &self.records.len())
            .field("frontier", &self.frontier)
            .field("ready_page", &self.ready_page)
            .finish()
    }
}
