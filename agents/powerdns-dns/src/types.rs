//! Record and Record-Set Types
//!
//! Caller-facing records, the server-side record-set unit, and the
//! composite key both pipelines group on.

use serde::{Deserialize, Serialize};

/// A single desired DNS entry supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Owner name (relative or absolute)
    pub name: String,
    /// Record type (A, AAAA, CNAME, TXT, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content in presentation format
    pub value: String,
    /// TTL in seconds
    pub ttl: u32,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
            ttl,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, &self.record_type)
    }
}

/// Composite (name, type) key identifying one record set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordKey {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

impl RecordKey {
    pub fn new(name: &str, record_type: &str) -> Self {
        Self {
            name: name.to_string(),
            record_type: record_type.to_string(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.record_type)
    }
}

/// How a record set should be mutated on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirective {
    /// Key is absent from the zone; the set is new
    Create,
    /// Overwrite the set with the given values
    #[default]
    Replace,
    /// Remove the whole set
    Delete,
}

impl std::fmt::Display for ChangeDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeDirective::Create => write!(f, "create"),
            ChangeDirective::Replace => write!(f, "replace"),
            ChangeDirective::Delete => write!(f, "delete"),
        }
    }
}

/// Comment attached to a record set on the server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub modified_at: i64,
}

/// One value of a record set as stored on the server
///
/// Sets are deduplicated and culled by `content` alone; `disabled` rides
/// along so a round-trip never re-enables a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordValue {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
}

impl RecordValue {
    /// An enabled value
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
        }
    }

    pub fn disabled(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: true,
        }
    }
}

impl From<&str> for RecordValue {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for RecordValue {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// All values sharing one (name, type) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    pub values: Vec<RecordValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    pub change: ChangeDirective,
}

impl RecordSet {
    /// Create a set with the given values and no comments
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        values: Vec<RecordValue>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            values,
            comments: Vec::new(),
            change: ChangeDirective::default(),
        }
    }

    pub fn with_change(mut self, change: ChangeDirective) -> Self {
        self.change = change;
        self
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, &self.record_type)
    }

    /// Value contents in order
    pub fn contents(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.content.as_str()).collect()
    }
}

/// Snapshot of one zone as held by the server
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Zone {
    /// Server-side zone identifier used in API paths
    pub id: String,
    /// Canonical zone name with trailing dot
    pub name: String,
    pub rrsets: Vec<RecordSet>,
}
