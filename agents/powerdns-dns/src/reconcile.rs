//! Record-Set Reconciliation
//!
//! Pure transformation from a zone snapshot plus caller records into the
//! record-set directives that converge the zone. No I/O happens here.
//!
//! - [`group`] buckets records by (name, type)
//! - [`merge`] adds values, reusing existing sets where the key matches
//! - [`cull`] removes values, deleting a set once its last value is gone
//!
//! Names must already be absolute and TXT values sanitized
//! (see [`crate::names::normalize_records`]) or keys will not match the
//! server's canonical form.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};

use crate::types::{ChangeDirective, Record, RecordKey, RecordSet, RecordValue, Zone};

/// Records sharing one (name, type) key, in input order
pub type Buckets = BTreeMap<RecordKey, Vec<Record>>;

/// Partition records into buckets keyed by (name, type)
pub fn group(records: &[Record]) -> Buckets {
    let mut buckets = Buckets::new();
    for record in records {
        buckets.entry(record.key()).or_default().push(record.clone());
    }
    buckets
}

/// Compute directives that add `desired` values to the zone
///
/// Existing sets with a matching key become `Replace` sets holding the
/// union of old and new values; keys absent from the zone become `Create`
/// sets. Never emits `Delete`.
pub fn merge(zone: &Zone, desired: &[Record]) -> Vec<RecordSet> {
    let mut buckets = group(desired);
    let mut rrsets = Vec::with_capacity(buckets.len());

    for existing in &zone.rrsets {
        let key = existing.key();
        let Some(records) = buckets.remove(&key) else {
            continue;
        };
        if records.is_empty() {
            continue;
        }

        let mut rrset = RecordSet {
            name: existing.name.clone(),
            record_type: existing.record_type.clone(),
            ttl: existing.ttl,
            values: existing.values.clone(),
            comments: existing.comments.clone(),
            change: ChangeDirective::Replace,
        };

        // Seeded from the server's values, then grown as we go so that
        // duplicates within the new records collapse as well.
        let mut seen: HashSet<String> =
            existing.values.iter().map(|v| v.content.clone()).collect();
        for record in records {
            if seen.insert(record.value.clone()) {
                rrset.values.push(RecordValue::new(record.value));
            }
        }

        trace!(key = %key, values = rrset.values.len(), "merged into existing set");
        rrsets.push(rrset);
    }

    // Whatever is left has no counterpart in the zone.
    for (key, records) in buckets {
        let Some(first) = records.first() else {
            continue;
        };
        let ttl = first.ttl;
        let record_type = first.record_type.clone();

        let mut seen = HashSet::new();
        let values: Vec<RecordValue> = records
            .into_iter()
            .map(|r| r.value)
            .filter(|v| seen.insert(v.clone()))
            .map(RecordValue::new)
            .collect();

        trace!(key = %key, values = values.len(), "new set");
        rrsets.push(
            RecordSet::new(key.name, record_type, ttl, values).with_change(ChangeDirective::Create),
        );
    }

    debug!(zone = %zone.name, directives = rrsets.len(), "merge planned");
    rrsets
}

/// Compute directives that remove `culls` values from the zone
///
/// Only sets that actually lose a value produce a directive. Values are
/// matched by exact content; values not targeted keep their order and
/// their disabled flag.
pub fn cull(zone: &Zone, culls: &[Record]) -> Vec<RecordSet> {
    let buckets = group(culls);
    let mut rrsets = Vec::new();

    for existing in &zone.rrsets {
        let key = existing.key();
        let Some(records) = buckets.get(&key).filter(|r| !r.is_empty()) else {
            continue;
        };

        let targets: HashSet<&str> = records.iter().map(|r| r.value.as_str()).collect();
        let values: Vec<RecordValue> = existing
            .values
            .iter()
            .filter(|v| !targets.contains(v.content.as_str()))
            .cloned()
            .collect();

        if values.len() == existing.values.len() {
            trace!(key = %key, "nothing to cull");
            continue;
        }

        let change = if values.is_empty() {
            ChangeDirective::Delete
        } else {
            ChangeDirective::Replace
        };

        trace!(key = %key, remaining = values.len(), %change, "culled");
        rrsets.push(RecordSet {
            name: existing.name.clone(),
            record_type: existing.record_type.clone(),
            ttl: existing.ttl,
            values,
            comments: existing.comments.clone(),
            change,
        });
    }

    debug!(zone = %zone.name, directives = rrsets.len(), "cull planned");
    rrsets
}
