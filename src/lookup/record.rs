// Typed lookup records
//
// Fields mirror what Club Log and country-files.com publish. Not every backend
// fills every field, so everything except the entity id is optional.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Optional validity bounds of a record
///
/// Both comparisons are strict: a record starting at 2000-01-01T00:00:00Z is not
/// yet valid at exactly that instant. This matches the published datasets'
/// historical behaviour and is kept for compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A window with neither bound
    pub fn always() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `at` falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), None) => start < at,
            (None, Some(end)) => end > at,
            (Some(start), Some(end)) => start < at && at < end,
            (None, None) => true,
        }
    }
}

/// Anything the temporal resolver can match against a timestamp
pub trait Windowed {
    fn window(&self) -> &ValidityWindow;
}

/// Common record shape for callsign exceptions, prefixes, invalid
/// operations and zone exceptions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adif: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cq_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itu_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Degrees, positive east
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub window: ValidityWindow,
}

impl Windowed for Record {
    fn window(&self) -> &ValidityWindow {
        &self.window
    }
}

/// A DXCC entity, keyed by its ADIF number
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entity {
    pub adif: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cq_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itu_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Degrees, positive east
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Period the entity counted for DXCC (informational only)
    #[serde(flatten)]
    pub window: ValidityWindow,
    /// Club Log whitelist flag: only listed operations count for this entity
    pub whitelisted: bool,
    #[serde(skip_serializing_if = "ValidityWindow::is_unbounded")]
    pub whitelist_window: ValidityWindow,
}
