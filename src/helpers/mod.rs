//! Helper Utilities
//!
//! Common utilities used across the crate.

mod fs;
mod secret;

pub use fs::*;
pub use secret::*;
