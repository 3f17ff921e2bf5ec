//! PowerDNS API Client
//!
//! Thin wrapper over the PowerDNS Authoritative HTTP API. Covers zone
//! lookup, full zone fetch and rrset PATCH submission, the only calls the
//! reconciliation flow needs.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::{PowerDnsError, Result};
use crate::types::{ChangeDirective, Comment, RecordSet, RecordValue, Zone};

/// Zone snapshot fetch and record-set submission
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// Fetch the full current state of the zone called `zone_name`
    async fn fetch_zone(&self, zone_name: &str) -> Result<Zone>;

    /// Submit record-set directives against zone `zone_id`
    async fn patch_rrsets(&self, zone_id: &str, rrsets: &[RecordSet]) -> Result<()>;
}

/// PowerDNS API client
#[derive(Clone)]
pub struct PowerDnsClient {
    client: Client,
    config: ProviderConfig,
}

// ============================================================
// API Wire Types
// ============================================================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct ZoneSummary {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FullZone {
    id: String,
    name: String,
    #[serde(default)]
    rrsets: Vec<WireRrSet>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireRrSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    changetype: Option<String>,
    #[serde(default)]
    records: Vec<RecordValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
struct PatchZoneRequest {
    rrsets: Vec<WireRrSet>,
}

/// PowerDNS has no create verb; a new set is a REPLACE of nothing
fn wire_changetype(change: ChangeDirective) -> &'static str {
    match change {
        ChangeDirective::Create | ChangeDirective::Replace => "REPLACE",
        ChangeDirective::Delete => "DELETE",
    }
}

impl From<&RecordSet> for WireRrSet {
    fn from(rrset: &RecordSet) -> Self {
        let records = match rrset.change {
            ChangeDirective::Delete => Vec::new(),
            _ => rrset.values.clone(),
        };
        Self {
            name: rrset.name.clone(),
            record_type: rrset.record_type.clone(),
            ttl: rrset.ttl,
            changetype: Some(wire_changetype(rrset.change).to_string()),
            records,
            comments: rrset.comments.clone(),
        }
    }
}

impl From<WireRrSet> for RecordSet {
    fn from(wire: WireRrSet) -> Self {
        Self {
            name: wire.name,
            record_type: wire.record_type,
            ttl: wire.ttl,
            values: wire.records,
            comments: wire.comments,
            change: ChangeDirective::Replace,
        }
    }
}

// ============================================================
// Client Implementation
// ============================================================

impl PowerDnsClient {
    /// Create a new client from validated settings
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("powerdns-dns/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn zones_url(&self) -> String {
        format!(
            "{}/api/v1/servers/{}/zones",
            self.config.base_url(),
            self.config.server_id
        )
    }

    fn zone_url(&self, zone_id: &str) -> String {
        format!("{}/{}", self.zones_url(), zone_id)
    }

    /// Turn a non-success response into an API error
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        Err(PowerDnsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Resolve a zone name to its server-side ID
    pub async fn zone_id(&self, zone_name: &str) -> Result<String> {
        debug!("Looking up zone ID for: {}", zone_name);

        let response = self
            .client
            .get(self.zones_url())
            .header("X-API-Key", &self.config.api_token)
            .query(&[("zone", zone_name)])
            .send()
            .await?;

        let mut zones: Vec<ZoneSummary> = Self::check(response).await?.json().await?;

        match zones.len() {
            0 => Err(PowerDnsError::ZoneNotFound {
                zone: zone_name.to_string(),
            }),
            1 => {
                let zone = zones.remove(0);
                debug!("Found zone ID: {} ({})", zone.id, zone.name);
                Ok(zone.id)
            }
            count => Err(PowerDnsError::AmbiguousZone {
                zone: zone_name.to_string(),
                count,
            }),
        }
    }
}

#[async_trait]
impl ZoneApi for PowerDnsClient {
    async fn fetch_zone(&self, zone_name: &str) -> Result<Zone> {
        let zone_id = self.zone_id(zone_name).await?;

        let response = self
            .client
            .get(self.zone_url(&zone_id))
            .header("X-API-Key", &self.config.api_token)
            .send()
            .await?;

        let full: FullZone = Self::check(response).await?.json().await?;

        debug!(zone = %full.name, rrsets = full.rrsets.len(), "Fetched zone");

        Ok(Zone {
            id: full.id,
            name: full.name,
            rrsets: full.rrsets.into_iter().map(RecordSet::from).collect(),
        })
    }

    async fn patch_rrsets(&self, zone_id: &str, rrsets: &[RecordSet]) -> Result<()> {
        if rrsets.is_empty() {
            debug!(zone_id, "No record sets to submit");
            return Ok(());
        }

        let request = PatchZoneRequest {
            rrsets: rrsets.iter().map(WireRrSet::from).collect(),
        };

        let response = self
            .client
            .patch(self.zone_url(zone_id))
            .header("X-API-Key", &self.config.api_token)
            .json(&request)
            .send()
            .await?;

        Self::check(response).await?;

        info!(zone_id, rrsets = rrsets.len(), "Submitted record sets");
        Ok(())
    }
}
