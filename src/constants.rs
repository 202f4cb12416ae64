//! Pager Constants
//!
//! Centralized defaults shared by the paginator, the listing clients and the config.

/// Rows shown per page in the review table
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Rows requested per listing call, independent of the page size
pub const DEFAULT_BATCH_LIMIT: u32 = 100;

/// HTTP request timeout for the hosted API
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the API key on GraphQL requests
pub const API_KEY_HEADER: &str = "x-api-key";

/// Config file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Log file prefix used by the rolling file appender
pub const LOG_FILE_PREFIX: &str = "referral-pager.log";
