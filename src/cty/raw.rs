// Raw decoded records
//
// Decoders hand the builders plain text values under normalized field names,
// whatever the source format called them. Typing happens in the builder.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Normalized field names shared by all decoders
pub mod fields {
    /// Lookup key: callsign or prefix
    pub const CALL: &str = "call";
    pub const COUNTRY: &str = "country";
    pub const ADIF: &str = "adif";
    pub const CQZ: &str = "cqz";
    pub const ITUZ: &str = "ituz";
    pub const CONTINENT: &str = "cont";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "long";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const DELETED: &str = "deleted";
    pub const WHITELIST: &str = "whitelist";
    pub const WHITELIST_START: &str = "whitelist_start";
    pub const WHITELIST_END: &str = "whitelist_end";
    /// Primary prefix of an entity
    pub const PREFIX: &str = "prefix";
    /// Set on plist entries that describe one full callsign
    pub const EXACT_CALLSIGN: &str = "exact_callsign";
}

/// One decoded record (field name → raw text)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Builder-style insert, handy for assembling fixtures
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Get a field value; empty values count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn call(&self) -> Option<&str> {
        self.get(fields::CALL)
    }
}

/// Attributes of the Club Log root element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClublogHeader {
    pub date: Option<DateTime<Utc>>,
    pub namespace: Option<String>,
}

impl ClublogHeader {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.namespace.is_some()
    }
}

/// Decoded Club Log cty.xml, one list per section in document order
#[derive(Debug, Clone, Default)]
pub struct ClublogDataset {
    pub header: ClublogHeader,
    pub entities: Vec<RawRecord>,
    pub exceptions: Vec<RawRecord>,
    pub prefixes: Vec<RawRecord>,
    pub invalid_operations: Vec<RawRecord>,
    pub zone_exceptions: Vec<RawRecord>,
}

/// Decoded country-files.com cty.plist, entries in document order
#[derive(Debug, Clone, Default)]
pub struct CountryFileDataset {
    pub records: Vec<RawRecord>,
}
