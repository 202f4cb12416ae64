//! Pagination
//!
//! Fixed-size pages over cursor-based listings.

mod look_ahead;
mod shared;

pub use look_ahead::*;
pub use shared::*;
