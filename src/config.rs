// Lookup configuration
//
// Plain serde struct, every field defaulted so a partial JSON file works.
// Example:
//   { "lookup_type": "countryfile", "country_mapping": "countryfilemapping.json" }

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Result;

pub const CLUBLOG_APIKEY_ENV: &str = "CLUBLOG_APIKEY";

pub const DEFAULT_CLUBLOG_XML_URL: &str = "https://secure.clublog.org/cty.php";
pub const DEFAULT_CLUBLOG_API_URL: &str = "https://secure.clublog.org/dxcc";
pub const DEFAULT_COUNTRYFILE_URL: &str = "https://www.country-files.com/cty/cty.plist";

/// Which data source backs the lookup facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupType {
    #[default]
    ClublogXml,
    CountryFile,
    ClublogApi,
}

impl LookupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupType::ClublogXml => "clublogxml",
            LookupType::CountryFile => "countryfile",
            LookupType::ClublogApi => "clublogapi",
        }
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clublogxml" => Ok(LookupType::ClublogXml),
            "countryfile" => Ok(LookupType::CountryFile),
            "clublogapi" => Ok(LookupType::ClublogApi),
            other => Err(format!(
                "unknown lookup type '{}' (expected clublogxml, countryfile or clublogapi)",
                other
            )),
        }
    }
}

fn default_clublog_xml_url() -> String {
    DEFAULT_CLUBLOG_XML_URL.to_string()
}

fn default_clublog_api_url() -> String {
    DEFAULT_CLUBLOG_API_URL.to_string()
}

fn default_countryfile_url() -> String {
    DEFAULT_COUNTRYFILE_URL.to_string()
}

fn default_download_timeout() -> u64 {
    10
}

fn default_api_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    #[serde(default)]
    pub lookup_type: LookupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Local dataset; when set nothing is downloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_mapping: Option<PathBuf>,
    #[serde(default = "default_clublog_xml_url")]
    pub clublog_xml_url: String,
    #[serde(default = "default_clublog_api_url")]
    pub clublog_api_url: String,
    #[serde(default = "default_countryfile_url")]
    pub countryfile_url: String,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            lookup_type: LookupType::default(),
            api_key: None,
            filename: None,
            country_mapping: None,
            clublog_xml_url: default_clublog_xml_url(),
            clublog_api_url: default_clublog_api_url(),
            countryfile_url: default_countryfile_url(),
            download_timeout_secs: default_download_timeout(),
            api_timeout_secs: default_api_timeout(),
            cache_dir: None,
        }
    }
}

impl LookupConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `CLUBLOG_APIKEY` from the environment, if set and non-blank
    pub fn with_env_overrides(self) -> Self {
        let key = std::env::var(CLUBLOG_APIKEY_ENV).ok();
        self.with_api_key_override(key)
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        self
    }

    /// Where downloaded datasets land
    pub fn download_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
