// Callsign / prefix lookup engine
//
// `LookupLib` is the public facade. It owns exactly one backend at a time and
// normalizes every key before handing it on. Loading a new dataset builds the
// replacement backend completely before it is published, so a failed reload
// leaves the active backend untouched.

pub mod backend;
pub mod builder;
pub mod record;
pub mod remote;
pub mod resolver;
pub mod store;

pub use backend::{Backend, ClublogXmlBackend, CountryFileBackend};
pub use builder::{build_full_reference, build_prefix_file, FullReferenceData, PrefixFileData};
pub use record::{Entity, Record, ValidityWindow, Windowed};
pub use remote::ClublogApi;
pub use resolver::resolve;
pub use store::{Category, KeyIndex, RecordStore};

use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;

use crate::config::{LookupConfig, LookupType};
use crate::cty::{
    parse_clublog_xml, parse_country_plist, read_clublog_xml, read_country_plist, ClublogHeader,
    CountryMapping,
};
use crate::error::{LookupError, Result};

/// Canonical form of a lookup key: trimmed, uppercase
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub struct LookupLib {
    backend: Box<dyn Backend>,
}

impl LookupLib {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn from_clublog_xml_str(content: &str) -> Result<Self> {
        let dataset = parse_clublog_xml(content)?;
        let data = build_full_reference(&dataset)?;
        Ok(Self::new(Box::new(ClublogXmlBackend::new(data))))
    }

    pub fn from_clublog_xml_file(path: &Path) -> Result<Self> {
        log::debug!("Loading Club Log XML from {}", path.display());
        let dataset = read_clublog_xml(path)?;
        let data = build_full_reference(&dataset)?;
        Ok(Self::new(Box::new(ClublogXmlBackend::new(data))))
    }

    pub fn from_countryfile_str(content: &str, mapping: Option<&CountryMapping>) -> Result<Self> {
        let dataset = parse_country_plist(content)?;
        let data = build_prefix_file(&dataset, mapping)?;
        Ok(Self::new(Box::new(CountryFileBackend::new(data))))
    }

    pub fn from_countryfile(path: &Path, mapping: Option<&CountryMapping>) -> Result<Self> {
        log::debug!("Loading country file from {}", path.display());
        let dataset = read_country_plist(path)?;
        let data = build_prefix_file(&dataset, mapping)?;
        Ok(Self::new(Box::new(CountryFileBackend::new(data))))
    }

    pub fn clublog_api(api_key: Option<String>, url: &str, timeout: Duration) -> Result<Self> {
        let api = ClublogApi::new(api_key, url, timeout)?;
        Ok(Self::new(Box::new(api)))
    }

    /// Build the backend named by `config`
    ///
    /// `dataset` overrides `config.filename` for the file-based backends; it
    /// is typically the path returned by `fetch::resolve_dataset`.
    pub fn from_config(config: &LookupConfig, dataset: Option<&Path>) -> Result<Self> {
        let dataset = dataset.or(config.filename.as_deref());
        match config.lookup_type {
            LookupType::ClublogXml => {
                let path = dataset.ok_or_else(|| missing_dataset(config.lookup_type))?;
                Self::from_clublog_xml_file(path)
            }
            LookupType::CountryFile => {
                let path = dataset.ok_or_else(|| missing_dataset(config.lookup_type))?;
                let mapping = config
                    .country_mapping
                    .as_deref()
                    .map(CountryMapping::load)
                    .transpose()?;
                Self::from_countryfile(path, mapping.as_ref())
            }
            LookupType::ClublogApi => Self::clublog_api(
                config.api_key.clone(),
                &config.clublog_api_url,
                Duration::from_secs(config.api_timeout_secs),
            ),
        }
    }

    /// Replace the active backend with a freshly built one
    ///
    /// The current backend keeps serving until `build` has succeeded. On
    /// error it stays active and the error is returned.
    pub fn reload<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce() -> Result<LookupLib>,
    {
        let next = build()?;
        log::info!(
            "Lookup backend replaced: {} -> {}",
            self.backend.lookup_type(),
            next.backend.lookup_type()
        );
        self.backend = next.backend;
        Ok(())
    }

    pub fn lookup_type(&self) -> LookupType {
        self.backend.lookup_type()
    }

    /// Club Log dataset header, for the XML backend only
    pub fn header(&self) -> Option<&ClublogHeader> {
        self.backend.header()
    }

    pub fn lookup_entity(&self, adif: u16) -> Result<Entity> {
        self.backend.lookup_entity(adif)
    }

    pub fn lookup_callsign(&self, callsign: &str, at: DateTime<Utc>) -> Result<Record> {
        self.backend.lookup_callsign(&normalize_key(callsign), at)
    }

    pub fn lookup_prefix(&self, prefix: &str, at: DateTime<Utc>) -> Result<Record> {
        self.backend.lookup_prefix(&normalize_key(prefix), at)
    }

    pub fn is_invalid_operation(&self, callsign: &str, at: DateTime<Utc>) -> Result<bool> {
        self.backend.is_invalid_operation(&normalize_key(callsign), at)
    }

    pub fn lookup_zone_exception(&self, callsign: &str, at: DateTime<Utc>) -> Result<u8> {
        self.backend.lookup_zone_exception(&normalize_key(callsign), at)
    }
}

fn missing_dataset(lookup_type: LookupType) -> LookupError {
    LookupError::SourceCorrupt(format!("no dataset file given for {} lookup", lookup_type))
}
