//! PowerDNS DNS Agent Library
//!
//! Reconciles caller-supplied DNS records against a PowerDNS zone and
//! submits the resulting record-set changes.

pub mod config;
pub mod error;
pub mod names;
pub mod powerdns;
pub mod provider;
pub mod reconcile;
pub mod secrets;
pub mod types;

pub use config::ProviderConfig;
pub use error::PowerDnsError;
pub use powerdns::{PowerDnsClient, ZoneApi};
pub use provider::{Plan, Provider};
pub use reconcile::{cull, group, merge};
pub use secrets::TokenSource;
pub use types::{ChangeDirective, Comment, Record, RecordKey, RecordSet, RecordValue, Zone};
