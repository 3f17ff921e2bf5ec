//! Provider Configuration
//!
//! Connection settings for a PowerDNS Authoritative server.

use serde::Deserialize;
use std::time::Duration;

use crate::error::{PowerDnsError, Result};

/// Server ID used by a stock PowerDNS install
pub const DEFAULT_SERVER_ID: &str = "localhost";

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// PowerDNS connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the server, e.g. `http://127.0.0.1:8081`
    pub server_url: String,
    /// Server ID in API paths
    #[serde(default = "default_server_id")]
    pub server_id: String,
    /// Value sent in the `X-API-Key` header
    pub api_token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server_id() -> String {
    DEFAULT_SERVER_ID.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProviderConfig {
    pub fn new(server_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            server_id: default_server_id(),
            api_token: api_token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the server ID; an empty value falls back to `localhost`
    pub fn server_id(mut self, server_id: impl Into<String>) -> Self {
        let server_id = server_id.into();
        self.server_id = if server_id.is_empty() {
            default_server_id()
        } else {
            server_id
        };
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    /// Check the settings before a client is built
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(PowerDnsError::InvalidConfig("server URL is required".to_string()));
        }
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(PowerDnsError::InvalidConfig(format!(
                "server URL must be http(s): {}",
                self.server_url
            )));
        }
        if self.api_token.is_empty() {
            return Err(PowerDnsError::InvalidConfig("API token is required".to_string()));
        }
        Ok(())
    }
}
