//! Record Provider
//!
//! Get / append / set / delete operations over a [`ZoneApi`]. Each call
//! normalizes the caller's records, fetches one zone snapshot, plans the
//! directives with [`crate::reconcile`] and submits them.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::Result;
use crate::names::{canonical_zone, normalize_records, relative_name};
use crate::powerdns::ZoneApi;
use crate::reconcile;
use crate::types::{ChangeDirective, Record, RecordKey, RecordSet, RecordValue};

/// Directives planned against one zone
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub zone_id: String,
    pub rrsets: Vec<RecordSet>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }

    /// Number of directives with the given tag
    pub fn count(&self, change: ChangeDirective) -> usize {
        self.rrsets.iter().filter(|s| s.change == change).count()
    }
}

/// Record-level operations against a PowerDNS zone
pub struct Provider<A> {
    api: A,
}

impl<A: ZoneApi> Provider<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// List every record in the zone, names relative to it
    pub async fn get_records(&self, zone: &str) -> Result<Vec<Record>> {
        let snapshot = self.api.fetch_zone(&canonical_zone(zone)).await?;

        let records = snapshot
            .rrsets
            .iter()
            .flat_map(|rrset| {
                let name = relative_name(&rrset.name, &snapshot.name);
                rrset.values.iter().map(move |value| Record {
                    name: name.clone(),
                    record_type: rrset.record_type.clone(),
                    value: value.content.clone(),
                    ttl: rrset.ttl,
                })
            })
            .collect();

        Ok(records)
    }

    /// Plan the directives that add `records` without submitting them
    pub async fn plan_append(&self, zone: &str, records: &[Record]) -> Result<Plan> {
        let records = normalize_records(zone, records);
        let snapshot = self.api.fetch_zone(&canonical_zone(zone)).await?;

        Ok(Plan {
            zone_id: snapshot.id.clone(),
            rrsets: reconcile::merge(&snapshot, &records),
        })
    }

    /// Add `records` to the zone, keeping values already present
    pub async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let plan = self.plan_append(zone, records).await?;

        info!(
            zone,
            created = plan.count(ChangeDirective::Create),
            replaced = plan.count(ChangeDirective::Replace),
            "Appending records"
        );

        self.api.patch_rrsets(&plan.zone_id, &plan.rrsets).await?;
        Ok(normalize_records(zone, records))
    }

    /// Overwrite each (name, type) in `records` with exactly their values
    ///
    /// A value already disabled on the server stays disabled.
    pub async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let records = normalize_records(zone, records);
        let snapshot = self.api.fetch_zone(&canonical_zone(zone)).await?;

        let disabled: HashSet<(RecordKey, &str)> = snapshot
            .rrsets
            .iter()
            .flat_map(|rrset| {
                rrset
                    .values
                    .iter()
                    .filter(|v| v.disabled)
                    .map(move |v| (rrset.key(), v.content.as_str()))
            })
            .collect();

        let rrsets: Vec<RecordSet> = reconcile::group(&records)
            .into_iter()
            .filter_map(|(key, bucket)| {
                let first = bucket.first()?;
                let ttl = first.ttl;
                let record_type = first.record_type.clone();
                let mut seen = HashSet::new();
                let values = bucket
                    .into_iter()
                    .map(|r| r.value)
                    .filter(|v| seen.insert(v.clone()))
                    .map(|v| RecordValue {
                        disabled: disabled.contains(&(key.clone(), v.as_str())),
                        content: v,
                    })
                    .collect();
                Some(RecordSet::new(key.name, record_type, ttl, values))
            })
            .collect();

        info!(zone, replaced = rrsets.len(), "Setting records");

        self.api.patch_rrsets(&snapshot.id, &rrsets).await?;
        Ok(records)
    }

    /// Plan the directives that remove `records` without submitting them
    pub async fn plan_delete(&self, zone: &str, records: &[Record]) -> Result<Plan> {
        let records = normalize_records(zone, records);
        let snapshot = self.api.fetch_zone(&canonical_zone(zone)).await?;

        Ok(Plan {
            zone_id: snapshot.id.clone(),
            rrsets: reconcile::cull(&snapshot, &records),
        })
    }

    /// Remove `records` from the zone
    ///
    /// Returns the records whose values were present and are now gone.
    pub async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let records = normalize_records(zone, records);
        let snapshot = self.api.fetch_zone(&canonical_zone(zone)).await?;

        let present: HashSet<(RecordKey, &str)> = snapshot
            .rrsets
            .iter()
            .flat_map(|rrset| {
                rrset
                    .values
                    .iter()
                    .map(move |v| (rrset.key(), v.content.as_str()))
            })
            .collect();

        let (deleted, missing): (Vec<Record>, Vec<Record>) = records
            .iter()
            .cloned()
            .partition(|r| present.contains(&(r.key(), r.value.as_str())));

        for record in &missing {
            warn!(
                name = %record.name,
                record_type = %record.record_type,
                "Record not present in zone"
            );
        }

        let rrsets = reconcile::cull(&snapshot, &records);

        info!(
            zone,
            deleted = rrsets.iter().filter(|s| s.change == ChangeDirective::Delete).count(),
            replaced = rrsets.iter().filter(|s| s.change == ChangeDirective::Replace).count(),
            "Deleting records"
        );

        self.api.patch_rrsets(&snapshot.id, &rrsets).await?;
        Ok(deleted)
    }
}
