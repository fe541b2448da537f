// Lookup error taxonomy
//
// NoMatch is the normal "nothing recorded" answer and is expected in daily use.
// The other variants abort the call (or the whole dataset load) they came from.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

/// Errors returned by dataset loading and by every lookup operation
#[derive(Debug, Error)]
pub enum LookupError {
    /// Key unknown, no record valid at the requested time, or the
    /// active backend does not carry this kind of data
    #[error("no matching record")]
    NoMatch,

    /// Club Log credential absent or rejected by the server
    #[error("Club Log API key missing or invalid")]
    CredentialMissing,

    /// Dataset is empty, truncated or carries unparseable values
    #[error("dataset corrupt: {0}")]
    SourceCorrupt(String),

    /// Network error, timeout or non-success HTTP status
    #[error("transport failure: {0}")]
    Transport(String),
}

impl LookupError {
    pub fn is_no_match(&self) -> bool {
        matches!(self, LookupError::NoMatch)
    }
}

impl From<std::io::Error> for LookupError {
    fn from(e: std::io::Error) -> Self {
        LookupError::SourceCorrupt(format!("I/O error: {}", e))
    }
}

impl From<quick_xml::Error> for LookupError {
    fn from(e: quick_xml::Error) -> Self {
        LookupError::SourceCorrupt(format!("XML error: {}", e))
    }
}

impl From<quick_xml::events::attributes::AttrError> for LookupError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        LookupError::SourceCorrupt(format!("XML attribute error: {}", e))
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::SourceCorrupt(format!("JSON error: {}", e))
    }
}

impl From<zip::result::ZipError> for LookupError {
    fn from(e: zip::result::ZipError) -> Self {
        LookupError::SourceCorrupt(format!("zip archive error: {}", e))
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::Transport(e.to_string())
    }
}
