//! Config - Application Configuration
//!
//! Persisted as TOML. Missing sections fall back to defaults; the API key is
//! stored sealed (see [`crate::helpers::seal_secret`]).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

use crate::constants::{DEFAULT_BATCH_LIMIT, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::helpers::{open_secret, seal_secret};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Region shown when no region is given on the command line
    pub region: Option<String>,
    /// Hosted API settings
    pub api: ApiConfig,
    /// Paging settings
    pub pager: PagerConfig,
}

/// Hosted GraphQL API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// API key (sealed storage)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Plaintext API key. Values that fail to open are taken as plaintext.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(|k| open_secret(k).unwrap_or_else(|_| k.to_string()))
    }

    /// Store a plaintext API key sealed
    pub fn set_api_key(&mut self, plain: &str) -> Result<()> {
        self.api_key = Some(seal_secret(plain)?);
        Ok(())
    }

    /// Check that an endpoint is configured
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::Invalid {
                message: "api.endpoint is not configured".to_string(),
            });
        }
        Ok(())
    }
}

/// Paginator configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PagerConfig {
    /// Rows per UI page
    pub page_size: usize,
    /// Rows requested per listing call
    pub batch_limit: u32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

impl PagerConfig {
    /// Check that both sizes are positive
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Invalid {
                message: "pager.page_size must be positive".to_string(),
            });
        }
        if self.batch_limit == 0 {
            return Err(Error::Invalid {
                message: "pager.batch_limit must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from a TOML file. A missing or empty file yields defaults.
    pub fn try_load(path: &Path) -> Result<Self> {
        info!(path = ?path, "Loading config file");
        if !path.exists() {
            return Ok(Self::default());
        }

        let value = std::fs::read_to_string(path)?;
        if value.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = toml::from_str(&value).map_err(|e| {
            error!(error = %e, path = ?path, "Failed to parse config file");
            e
        })?;
        config.pager.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!(path = ?path, "Config saved");
        Ok(())
    }
}
