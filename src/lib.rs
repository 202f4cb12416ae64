//! referral-pager Library
//!
//! Fixed-size paging over the hosted access point listing, used by the admin
//! review queue of the referral service to verify provider licences.

pub mod constants;
pub mod domain;
pub mod error;
pub mod features;
pub mod helpers;
pub mod listing;
pub mod pager;
