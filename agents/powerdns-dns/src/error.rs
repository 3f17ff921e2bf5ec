//! PowerDNS Agent Errors

use thiserror::Error;

/// Errors that can occur while talking to a PowerDNS server
#[derive(Debug, Error)]
pub enum PowerDnsError {
    /// No zone on the server matched the requested name
    #[error("Zone not found: {zone}")]
    ZoneNotFound { zone: String },

    /// More than one zone matched the requested name
    #[error("Zone '{zone}' is ambiguous ({count} matches)")]
    AmbiguousZone { zone: String, count: usize },

    /// The server answered with a non-success status
    #[error("PowerDNS API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PowerDnsError>;
