// dxlookup library
// Re-export modules for use in main.rs

pub mod config;
pub mod cty;
pub mod error;
pub mod fetch;
pub mod lookup;
pub mod time_utils;

pub use config::{LookupConfig, LookupType};
pub use error::{LookupError, Result};
pub use lookup::{normalize_key, Entity, LookupLib, Record, ValidityWindow};
pub use time_utils::parse_utc_timestamp;
