//! Domain - Pure Data Structures
//!
//! Filters, access point records and configuration.

pub mod config;
pub mod filter;
pub mod record;

pub use config::*;
pub use filter::*;
pub use record::*;
