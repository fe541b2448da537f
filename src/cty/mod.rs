// Dataset decoders
//
// Turn Club Log cty.xml and country-files.com cty.plist documents into plain
// text records for the lookup builders. No typing or validation happens here
// beyond well-formedness of the document.

pub mod clublog_xml;
pub mod mapping;
pub mod plist;
pub mod raw;

pub use clublog_xml::{parse_clublog_xml, read_clublog_xml};
pub use mapping::CountryMapping;
pub use plist::{parse_country_plist, read_country_plist};
pub use raw::{fields, ClublogDataset, ClublogHeader, CountryFileDataset, RawRecord};
