//! Verify Feature
//!
//! Review queue of unverified access points, paged per region.

pub mod controller;
