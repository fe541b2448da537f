// Country name → ADIF number table
//
// country-files.com does not publish ADIF numbers in every file revision, so
// the prefix-file backend can be given a JSON object such as
//   { "Falkland Islands": 141, "South Sandwich Islands": "240" }
// Values may be numbers or numeric strings.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{LookupError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum AdifValue {
    Number(u16),
    Text(String),
}

/// Static country-name → ADIF table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryMapping {
    map: HashMap<String, u16>,
}

impl CountryMapping {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        Self {
            map: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parse the JSON mapping document
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, AdifValue> = serde_json::from_str(content)?;
        let mut map = HashMap::with_capacity(raw.len());
        for (country, value) in raw {
            let adif = match value {
                AdifValue::Number(n) => n,
                AdifValue::Text(s) => s.trim().parse().map_err(|_| {
                    LookupError::SourceCorrupt(format!(
                        "country mapping for '{}' is not a number: '{}'",
                        country, s
                    ))
                })?,
            };
            map.insert(country, adif);
        }
        log::debug!("Loaded {} country mappings", map.len());
        Ok(Self { map })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, country: &str) -> Option<u16> {
        self.map.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
