//! Error types for referral-pager
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

/// Main error type for the crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// IO error (config file operations)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// TOML serialization error
    #[snafu(display("TOML serialize error: {source}"))]
    TomlSe { source: toml::ser::Error },

    /// The listing call failed while loading a page
    #[snafu(display("Remote fetch failed while loading page {page}: {source}"))]
    RemoteFetch { page: usize, source: FetchError },

    /// The review mutation failed for a record
    #[snafu(display("Review update failed for {owner}: {source}"))]
    ReviewUpdate { owner: String, source: FetchError },

    /// Another load is already in flight on the same paginator
    #[snafu(display("Busy: {message}"))]
    Busy { message: String },
}

/// Failure reported by a listing or mutation call
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FetchError {
    /// Transport failure
    #[snafu(display("HTTP request failed: {source}"))]
    Http { source: reqwest::Error },

    /// Non-success HTTP status
    #[snafu(display("Unexpected HTTP status {status}"))]
    Status { status: u16 },

    /// Errors reported by the GraphQL endpoint
    #[snafu(display("GraphQL error: {message}"))]
    GraphQl { message: String },

    /// Response or cursor that does not have the expected shape
    #[snafu(display("Malformed response: {message}"))]
    Malformed { message: String },

    /// The source refused to serve the call
    #[snafu(display("Listing unavailable: {message}"))]
    Unavailable { message: String },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(source: toml::ser::Error) -> Self {
        Error::TomlSe { source }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(source: reqwest::Error) -> Self {
        FetchError::Http { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
