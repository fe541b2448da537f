// Lookup backends
//
// Each backend implements only the operations its data supports. Everything
// else falls through to the trait defaults, which answer NoMatch so callers
// can treat all backends alike.
//
// | Operation       | Club Log XML | country-files | Club Log API |
// |-----------------|--------------|---------------|--------------|
// | entity          | yes          | -             | -            |
// | callsign        | resolver     | resolver      | remote call  |
// | prefix          | resolver     | resolver      | -            |
// | invalid op      | resolver     | -             | -            |
// | zone exception  | resolver     | -             | -            |

use chrono::{DateTime, Utc};

use super::builder::{FullReferenceData, PrefixFileData};
use super::record::{Entity, Record};
use super::remote::ClublogApi;
use super::resolver::resolve;
use crate::config::LookupType;
use crate::cty::ClublogHeader;
use crate::error::{LookupError, Result};

/// Uniform lookup surface over one loaded data source
///
/// Keys passed in are already normalized (trimmed, uppercase).
pub trait Backend: Send + Sync {
    fn lookup_type(&self) -> LookupType;

    fn lookup_entity(&self, _adif: u16) -> Result<Entity> {
        Err(LookupError::NoMatch)
    }

    fn lookup_callsign(&self, _callsign: &str, _at: DateTime<Utc>) -> Result<Record> {
        Err(LookupError::NoMatch)
    }

    fn lookup_prefix(&self, _prefix: &str, _at: DateTime<Utc>) -> Result<Record> {
        Err(LookupError::NoMatch)
    }

    fn is_invalid_operation(&self, _callsign: &str, _at: DateTime<Utc>) -> Result<bool> {
        Err(LookupError::NoMatch)
    }

    fn lookup_zone_exception(&self, _callsign: &str, _at: DateTime<Utc>) -> Result<u8> {
        Err(LookupError::NoMatch)
    }

    fn header(&self) -> Option<&ClublogHeader> {
        None
    }
}

/// Club Log cty.xml backend
pub struct ClublogXmlBackend {
    data: FullReferenceData,
}

impl ClublogXmlBackend {
    pub fn new(data: FullReferenceData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &FullReferenceData {
        &self.data
    }
}

impl Backend for ClublogXmlBackend {
    fn lookup_type(&self) -> LookupType {
        LookupType::ClublogXml
    }

    fn lookup_entity(&self, adif: u16) -> Result<Entity> {
        self.data
            .entities
            .get(&adif)
            .cloned()
            .ok_or(LookupError::NoMatch)
    }

    fn lookup_callsign(&self, callsign: &str, at: DateTime<Utc>) -> Result<Record> {
        resolve(&self.data.exceptions, callsign, at).cloned()
    }

    fn lookup_prefix(&self, prefix: &str, at: DateTime<Utc>) -> Result<Record> {
        resolve(&self.data.prefixes, prefix, at).cloned()
    }

    fn is_invalid_operation(&self, callsign: &str, at: DateTime<Utc>) -> Result<bool> {
        resolve(&self.data.invalid_operations, callsign, at).map(|_| true)
    }

    fn lookup_zone_exception(&self, callsign: &str, at: DateTime<Utc>) -> Result<u8> {
        resolve(&self.data.zone_exceptions, callsign, at)?
            .cq_zone
            .ok_or(LookupError::NoMatch)
    }

    fn header(&self) -> Option<&ClublogHeader> {
        Some(&self.data.header)
    }
}

/// country-files.com cty.plist backend
pub struct CountryFileBackend {
    data: PrefixFileData,
}

impl CountryFileBackend {
    pub fn new(data: PrefixFileData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &PrefixFileData {
        &self.data
    }
}

impl Backend for CountryFileBackend {
    fn lookup_type(&self) -> LookupType {
        LookupType::CountryFile
    }

    fn lookup_callsign(&self, callsign: &str, at: DateTime<Utc>) -> Result<Record> {
        resolve(&self.data.exceptions, callsign, at).cloned()
    }

    fn lookup_prefix(&self, prefix: &str, at: DateTime<Utc>) -> Result<Record> {
        resolve(&self.data.prefixes, prefix, at).cloned()
    }
}

impl Backend for ClublogApi {
    fn lookup_type(&self) -> LookupType {
        LookupType::ClublogApi
    }

    fn lookup_callsign(&self, callsign: &str, at: DateTime<Utc>) -> Result<Record> {
        self.lookup(callsign, at)
    }
}
