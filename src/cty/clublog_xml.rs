// Club Log cty.xml decoder
//
// Layout: <clublog date=".." xmlns=".."> holds five sections; every child of a
// section is one record and every grandchild one field:
//
//   <exceptions>
//     <exception record="2">
//       <call>KC6RJW</call><entity>PALAU</entity><adif>22</adif>...
//     </exception>
//   </exceptions>
//
// The record attribute is not kept: ids are assigned by the builder.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::path::Path;

use super::raw::{fields, ClublogDataset, ClublogHeader, RawRecord};
use crate::error::{LookupError, Result};
use crate::time_utils::parse_dataset_timestamp;

/// Sections of the Club Log document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Entities,
    Exceptions,
    Prefixes,
    InvalidOperations,
    ZoneExceptions,
}

impl Section {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"entities" => Some(Section::Entities),
            b"exceptions" => Some(Section::Exceptions),
            b"prefixes" => Some(Section::Prefixes),
            b"invalid_operations" => Some(Section::InvalidOperations),
            b"zone_exceptions" => Some(Section::ZoneExceptions),
            _ => None,
        }
    }
}

/// Map a Club Log field tag onto the normalized field name
fn normalize_field(tag: &str) -> &str {
    match tag {
        "name" | "entity" => fields::COUNTRY,
        "zone" => fields::CQZ,
        other => other,
    }
}

fn section_mut(dataset: &mut ClublogDataset, section: Section) -> &mut Vec<RawRecord> {
    match section {
        Section::Entities => &mut dataset.entities,
        Section::Exceptions => &mut dataset.exceptions,
        Section::Prefixes => &mut dataset.prefixes,
        Section::InvalidOperations => &mut dataset.invalid_operations,
        Section::ZoneExceptions => &mut dataset.zone_exceptions,
    }
}

/// Read the date and namespace attributes of the root element
fn read_header(root: &BytesStart<'_>) -> Result<ClublogHeader> {
    let mut header = ClublogHeader::default();
    for attr in root.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"date" => {
                let value = attr.unescape_value()?;
                header.date = parse_dataset_timestamp(&value);
            }
            b"xmlns" => {
                header.namespace = Some(attr.unescape_value()?.into_owned());
            }
            _ => {}
        }
    }

    if header.is_complete() {
        log::debug!("Header successfully retrieved from Club Log file");
    } else {
        log::warn!(
            "Club Log header only partially retrieved: date={:?}, namespace={:?}",
            header.date,
            header.namespace
        );
    }
    Ok(header)
}

/// Decode a Club Log cty.xml document
pub fn parse_clublog_xml(content: &str) -> Result<ClublogDataset> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut dataset = ClublogDataset::default();
    let mut saw_root = false;
    let mut depth = 0usize;
    let mut section: Option<Section> = None;
    let mut current: Option<RawRecord> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        dataset.header = read_header(&e)?;
                        saw_root = true;
                    }
                    2 => section = Section::from_tag(e.local_name().as_ref()),
                    3 if section.is_some() => current = Some(RawRecord::new()),
                    4 if current.is_some() => {
                        let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                        field = Some(normalize_field(&tag).to_string());
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let value = t.unescape()?;
                    record.insert(name, &value);
                }
            }
            Event::CData(c) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let value = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    record.insert(name, &value);
                }
            }
            Event::End(_) => {
                match depth {
                    2 => section = None,
                    3 => {
                        if let (Some(sec), Some(record)) = (section, current.take()) {
                            section_mut(&mut dataset, sec).push(record);
                        }
                    }
                    4 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(LookupError::SourceCorrupt(
            "Club Log file has no root element".to_string(),
        ));
    }

    log::debug!(
        "Decoded Club Log file: {} entities, {} exceptions, {} prefixes, {} invalid operations, {} zone exceptions",
        dataset.entities.len(),
        dataset.exceptions.len(),
        dataset.prefixes.len(),
        dataset.invalid_operations.len(),
        dataset.zone_exceptions.len()
    );

    Ok(dataset)
}

/// Read and decode a Club Log cty.xml file
pub fn read_clublog_xml(path: &Path) -> Result<ClublogDataset> {
    log::debug!("Reading Club Log file {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_clublog_xml(&content)
}
