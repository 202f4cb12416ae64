//! Listing Sources
//!
//! The remote listing call and the review mutation call consumed by the
//! paginator and its caller, plus the implementations backing them.

mod graphql;
mod memory;
#[cfg(test)]
pub(crate) mod scripted;

pub use graphql::*;
pub use memory::*;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::domain::{Filter, RecordKey};
use crate::error::FetchError;

/// Opaque continuation token returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token. Empty tokens carry no continuation and yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one listing call
#[derive(Debug, Clone)]
pub struct RemoteBatch<T> {
    /// Records in listing order, already filtered server-side
    pub items: Vec<T>,
    /// Continuation, `None` when the listing is exhausted
    pub next_cursor: Option<Cursor>,
}

impl<T> RemoteBatch<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// Final batch of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Cursor-based remote listing
pub trait ListingSource: Send + Sync {
    /// Raw record type
    type Item: Send;

    /// Fetch up to `limit` rows after `cursor` (`None` = start of stream)
    fn list(
        &self,
        filter: &Filter,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<RemoteBatch<Self::Item>, FetchError>> + Send;
}

/// Write path: mark a record reviewed
pub trait ReviewStatusSink: Send + Sync {
    fn set_verified(
        &self,
        key: &RecordKey,
        verified: bool,
    ) -> impl Future<Output = Result<(), FetchError>> + Send;
}

impl<S: ListingSource + ?Sized> ListingSource for Arc<S> {
    type Item = S::Item;

    fn list(
        &self,
        filter: &Filter,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<RemoteBatch<Self::Item>, FetchError>> + Send {
        (**self).list(filter, limit, cursor)
    }
}

impl<S: ReviewStatusSink + ?Sized> ReviewStatusSink for Arc<S> {
    fn set_verified(
        &self,
        key: &RecordKey,
        verified: bool,
    ) -> impl Future<Output = Result<(), FetchError>> + Send {
        (**self).set_verified(key, verified)
    }
}
