// country-files.com cty.plist decoder
//
// The property list is one top-level dict mapping a prefix (or a full callsign
// when ExactCallsign is true) to a dict of attributes:
//
//   <key>VP8F</key>
//   <dict>
//     <key>Country</key><string>Falkland Islands</string>
//     <key>CQZone</key><integer>13</integer>
//     ...
//     <key>ExactCallsign</key><false/>
//   </dict>

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::path::Path;

use super::raw::{fields, CountryFileDataset, RawRecord};
use crate::error::{LookupError, Result};

/// What the next text node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Key,
    Value,
}

/// Map a plist attribute name onto the normalized field name
fn normalize_plist_key(key: &str) -> Option<&'static str> {
    match key {
        "Country" => Some(fields::COUNTRY),
        "CQZone" => Some(fields::CQZ),
        "ITUZone" => Some(fields::ITUZ),
        "Continent" => Some(fields::CONTINENT),
        "Latitude" => Some(fields::LATITUDE),
        "Longitude" => Some(fields::LONGITUDE),
        "ExactCallsign" => Some(fields::EXACT_CALLSIGN),
        _ => None,
    }
}

/// Attach a value to the attribute named by the last <key>
fn store_value(current: &mut Option<RawRecord>, field_key: &mut Option<String>, value: &str) {
    let (Some(record), Some(key)) = (current.as_mut(), field_key.take()) else {
        return;
    };
    if let Some(name) = normalize_plist_key(&key) {
        record.insert(name, value);
    }
}

/// Decode a cty.plist document
pub fn parse_country_plist(content: &str) -> Result<CountryFileDataset> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut dataset = CountryFileDataset::default();
    let mut saw_plist = false;
    let mut dict_depth = 0usize;
    let mut capture: Option<Capture> = None;
    let mut entry_key: Option<String> = None;
    let mut field_key: Option<String> = None;
    let mut current: Option<RawRecord> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"plist" => saw_plist = true,
                b"dict" => {
                    dict_depth += 1;
                    if dict_depth == 2 {
                        let key = entry_key.take().ok_or_else(|| {
                            LookupError::SourceCorrupt(format!(
                                "plist entry #{} has no key",
                                dataset.records.len()
                            ))
                        })?;
                        current = Some(RawRecord::new().with(fields::CALL, &key));
                    }
                }
                b"key" => capture = Some(Capture::Key),
                b"string" | b"integer" | b"real" | b"date" => capture = Some(Capture::Value),
                b"true" => store_value(&mut current, &mut field_key, "TRUE"),
                b"false" => store_value(&mut current, &mut field_key, "FALSE"),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"true" => store_value(&mut current, &mut field_key, "TRUE"),
                b"false" => store_value(&mut current, &mut field_key, "FALSE"),
                b"string" => store_value(&mut current, &mut field_key, ""),
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                match capture {
                    Some(Capture::Key) if dict_depth == 1 => entry_key = Some(text),
                    Some(Capture::Key) if dict_depth == 2 => field_key = Some(text),
                    Some(Capture::Value) => store_value(&mut current, &mut field_key, &text),
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"dict" => {
                    if dict_depth == 2 {
                        if let Some(record) = current.take() {
                            dataset.records.push(record);
                        }
                    }
                    dict_depth = dict_depth.saturating_sub(1);
                }
                b"key" | b"string" | b"integer" | b"real" | b"date" => capture = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_plist {
        return Err(LookupError::SourceCorrupt(
            "country file is not a property list".to_string(),
        ));
    }

    log::debug!("Decoded country file: {} entries", dataset.records.len());
    Ok(dataset)
}

/// Read and decode a cty.plist file
pub fn read_country_plist(path: &Path) -> Result<CountryFileDataset> {
    log::debug!("Reading country file {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_country_plist(&content)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_CTY_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>1A</key>
	<dict>
		<key>Country</key>
		<string>Sov Mil Order of Malta</string>
		<key>Prefix</key>
		<string>1A</string>
		<key>ADIF</key>
		<integer>246</integer>
		<key>CQZone</key>
		<integer>15</integer>
		<key>ITUZone</key>
		<integer>28</integer>
		<key>Continent</key>
		<string>EU</string>
		<key>Latitude</key>
		<real>41.90</real>
		<key>Longitude</key>
		<real>-12.43</real>
		<key>GMTOffset</key>
		<real>-1.0</real>
		<key>ExactCallsign</key>
		<false/>
	</dict>
	<key>VP8F</key>
	<dict>
		<key>Country</key>
		<string>Falkland Islands</string>
		<key>CQZone</key>
		<integer>13</integer>
		<key>ITUZone</key>
		<integer>16</integer>
		<key>Continent</key>
		<string>SA</string>
		<key>Latitude</key>
		<real>-51.63</real>
		<key>Longitude</key>
		<real>58.72</real>
		<key>ExactCallsign</key>
		<false/>
	</dict>
	<key>VP8STI</key>
	<dict>
		<key>Country</key>
		<string>South Sandwich Islands</string>
		<key>CQZone</key>
		<integer>13</integer>
		<key>ITUZone</key>
		<integer>73</integer>
		<key>Continent</key>
		<string>SA</string>
		<key>Latitude</key>
		<real>-58.43</real>
		<key>Longitude</key>
		<real>26.33</real>
		<key>ExactCallsign</key>
		<true/>
	</dict>
</dict>
</plist>
"#;

    #[test]
    fn test_parse_entries_in_document_order() {
        let dataset = parse_country_plist(SAMPLE_CTY_PLIST).unwrap();
        let calls: Vec<&str> = dataset.records.iter().filter_map(|r| r.call()).collect();
        assert_eq!(calls, vec!["1A", "VP8F", "VP8STI"]);
    }

    #[test]
    fn test_attributes_are_normalized() {
        let dataset = parse_country_plist(SAMPLE_CTY_PLIST).unwrap();
        let malta = &dataset.records[0];
        assert_eq!(malta.get(fields::COUNTRY), Some("Sov Mil Order of Malta"));
        assert_eq!(malta.get(fields::CQZ), Some("15"));
        assert_eq!(malta.get(fields::ITUZ), Some("28"));
        assert_eq!(malta.get(fields::CONTINENT), Some("EU"));
        assert_eq!(malta.get(fields::LATITUDE), Some("41.90"));
        assert_eq!(malta.get(fields::LONGITUDE), Some("-12.43"));
        assert_eq!(malta.get(fields::EXACT_CALLSIGN), Some("FALSE"));
        // ADIF numbers come from the mapping table, never from the plist
        assert!(!malta.has(fields::ADIF));
    }

    #[test]
    fn test_exact_callsign_flag() {
        let dataset = parse_country_plist(SAMPLE_CTY_PLIST).unwrap();
        assert_eq!(
            dataset.records[2].get(fields::EXACT_CALLSIGN),
            Some("TRUE")
        );
    }

    #[test]
    fn test_not_a_plist() {
        let result = parse_country_plist("<clublog></clublog>");
        assert!(matches!(result, Err(LookupError::SourceCorrupt(_))));
    }

    #[test]
    fn test_entry_without_key_is_corrupt() {
        let doc = "<plist><dict><dict><key>Country</key><string>X</string></dict></dict></plist>";
        assert!(matches!(
            parse_country_plist(doc),
            Err(LookupError::SourceCorrupt(_))
        ));
    }
}
