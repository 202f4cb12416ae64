//! Verify Controller
//!
//! Owns the paginator for the active region, loads pages for display and
//! runs the verify mutation. The paginator is never patched: a region change
//! or a successful review replaces it with a fresh instance.

use futures::future::join_all;
use snafu::ResultExt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{AccessPointItem, Filter, PagerConfig, ProviderRow, REGION_FIELD, RecordKey};
use crate::error::{Result, ReviewUpdateSnafu};
use crate::listing::{ListingSource, ReviewStatusSink};
use crate::pager::{LoadOutcome, LookAheadPaginator};

/// Rows of one page as shown to the user
#[derive(Debug, Clone)]
pub struct PageView {
    pub page: usize,
    pub rows: Vec<ProviderRow>,
    pub ready_page: usize,
    pub exhausted: bool,
    /// More rows exist, buffered or confirmed remotely, after this page
    pub has_next: bool,
    pub outcome: LoadOutcome,
}

/// Verify page controller
pub struct VerifyController<S>
where
    S: ListingSource<Item = AccessPointItem> + ReviewStatusSink,
{
    source: Arc<S>,
    config: PagerConfig,
    pager: LookAheadPaginator<Arc<S>, ProviderRow>,
    page: usize,
}

impl<S> VerifyController<S>
where
    S: ListingSource<Item = AccessPointItem> + ReviewStatusSink,
{
    /// Create a controller showing `region` (`None` = all regions)
    pub fn new(source: Arc<S>, config: PagerConfig, region: Option<&str>) -> Result<Self> {
        let pager = LookAheadPaginator::new(source.clone(), Filter::region(region), config)?;
        Ok(Self {
            source,
            config,
            pager,
            page: 0,
        })
    }

    /// Region of the active filter
    pub fn region(&self) -> Option<&str> {
        self.pager.filter().get(REGION_FIELD)
    }

    /// Current page index
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn pager(&self) -> &LookAheadPaginator<Arc<S>, ProviderRow> {
        &self.pager
    }

    /// Switch region. Returns `true` when the paginator was replaced.
    pub fn set_region(&mut self, region: Option<&str>) -> Result<bool> {
        let filter = Filter::region(region);
        if filter == *self.pager.filter() {
            return Ok(false);
        }
        info!(%filter, "Region changed, starting a new listing");
        self.replace_pager(filter)?;
        Ok(true)
    }

    /// Drop all buffered rows and list again from the start
    pub fn reload(&mut self) -> Result<()> {
        let filter = self.pager.filter().clone();
        self.replace_pager(filter)
    }

    fn replace_pager(&mut self, filter: Filter) -> Result<()> {
        self.pager = LookAheadPaginator::new(self.source.clone(), filter, self.config)?;
        self.page = 0;
        Ok(())
    }

    /// Load `page` if it is the pending page and return its rows
    pub async fn load_page(&mut self, page: usize) -> Result<PageView> {
        let outcome = self.pager.ensure_page_loaded(page).await?;
        self.page = page;

        let records = self.pager.records();
        let size = self.pager.page_size();
        let start = page.saturating_mul(size).min(records.len());
        let end = start.saturating_add(size).min(records.len());
        let ready_page = self.pager.ready_page();

        Ok(PageView {
            page,
            rows: records[start..end].to_vec(),
            ready_page,
            exhausted: self.pager.is_exhausted(),
            has_next: ready_page > page || records.len() > end,
            outcome,
        })
    }

    /// Mark access points verified, then list again from the start.
    ///
    /// The paginator is replaced even when some updates fail, since others
    /// may already have been applied. The first failure is returned.
    pub async fn verify(&mut self, keys: &[RecordKey]) -> Result<usize> {
        let source = &self.source;
        let results = join_all(keys.iter().map(|key| async move {
            source
                .set_verified(key, true)
                .await
                .context(ReviewUpdateSnafu {
                    owner: key.owner.clone(),
                })
        }))
        .await;

        self.reload()?;

        let mut verified = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(()) => verified += 1,
                Err(e) => {
                    warn!(error = %e, "Verify failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        info!(verified, requested = keys.len(), "Verify finished");

        match first_error {
            Some(e) => Err(e),
            None => Ok(verified),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::listing::MemoryListing;

    fn access_point(owner: &str, state: &str) -> AccessPointItem {
        AccessPointItem {
            owner: owner.to_string(),
            state: state.to_string(),
            license: None,
            license_expiration: None,
            verified: None,
            provider: None,
        }
    }

    fn listing(rows: Vec<AccessPointItem>) -> Arc<MemoryListing<AccessPointItem>> {
        Arc::new(MemoryListing::unverified_access_points(rows).with_scan_window(4))
    }

    fn owners(view: &PageView) -> Vec<&str> {
        view.rows.iter().map(|r| r.owner.as_str()).collect()
    }

    #[tokio::test]
    async fn pages_through_a_region() {
        let rows = (0..12).map(|i| access_point(&format!("u{i}"), "CA")).collect();
        let source = listing(rows);
        let mut controller =
            VerifyController::new(source, PagerConfig::default(), Some("CA")).expect("controller");

        let view = controller.load_page(0).await.expect("page 0");
        assert_eq!(owners(&view), vec!["u0", "u1", "u2", "u3", "u4"]);
        assert_eq!(view.ready_page, 1);
        assert!(view.has_next);

        let view = controller.load_page(1).await.expect("page 1");
        assert_eq!(owners(&view), vec!["u5", "u6", "u7", "u8", "u9"]);
        assert!(view.exhausted);
        assert!(view.has_next);

        let view = controller.load_page(2).await.expect("page 2");
        assert_eq!(view.outcome, LoadOutcome::Skipped);
        assert_eq!(owners(&view), vec!["u10", "u11"]);
        assert!(!view.has_next);
        assert_eq!(controller.page(), 2);
    }

    #[tokio::test]
    async fn region_change_replaces_the_paginator() {
        let rows = vec![
            access_point("a", "CA"),
            access_point("b", "NY"),
            access_point("c", "CA"),
        ];
        let source = listing(rows);
        let mut controller =
            VerifyController::new(source, PagerConfig::default(), Some("CA")).expect("controller");
        controller.load_page(0).await.expect("load");
        assert_eq!(controller.pager().records().len(), 2);

        assert!(!controller.set_region(Some("CA")).expect("same region"));
        assert_eq!(controller.pager().records().len(), 2);

        assert!(controller.set_region(Some("NY")).expect("new region"));
        assert_eq!(controller.region(), Some("NY"));
        assert!(controller.pager().records().is_empty());
        assert_eq!(controller.page(), 0);

        let view = controller.load_page(0).await.expect("load");
        assert_eq!(owners(&view), vec!["b"]);
        assert!(!view.has_next);

        assert!(controller.set_region(None).expect("all regions"));
        assert_eq!(controller.region(), None);
    }

    #[tokio::test]
    async fn verify_requeries_from_scratch() {
        let rows = (0..6).map(|i| access_point(&format!("u{i}"), "WA")).collect();
        let source = listing(rows);
        let mut controller = VerifyController::new(source.clone(), PagerConfig::default(), None)
            .expect("controller");
        controller.load_page(0).await.expect("load");
        let calls_before = source.call_count();

        let keys = vec![RecordKey::new("u0", "WA"), RecordKey::new("u3", "WA")];
        assert_eq!(controller.verify(&keys).await.expect("verify"), 2);
        assert!(controller.pager().records().is_empty());

        let view = controller.load_page(0).await.expect("load");
        assert_eq!(owners(&view), vec!["u1", "u2", "u4", "u5"]);
        assert!(source.call_count() > calls_before);
    }

    #[tokio::test]
    async fn failed_verify_still_reloads() {
        let rows = vec![access_point("a", "CA"), access_point("b", "CA")];
        let mut controller =
            VerifyController::new(listing(rows), PagerConfig::default(), None).expect("controller");
        controller.load_page(0).await.expect("load");

        let keys = vec![RecordKey::new("a", "CA"), RecordKey::new("ghost", "CA")];
        let err = controller.verify(&keys).await.expect_err("ghost fails");
        assert!(matches!(err, Error::ReviewUpdate { ref owner, .. } if owner == "ghost"));
        assert!(controller.pager().records().is_empty());

        let view = controller.load_page(0).await.expect("load");
        assert_eq!(owners(&view), vec!["b"]);
    }
}
