// Dataset builders
//
// Turn decoded text records into typed categories. Every category is built
// into fresh local structures; nothing is returned unless the whole dataset
// built cleanly.
//
// Parsing rules:
// - integers/floats: trimmed decimal text
// - longitude: sign inverted (sources publish positive-west)
// - booleans: "TRUE" (any case) is true, everything else false
// - timestamps: first 19 chars as %Y-%m-%dT%H:%M:%S, taken as UTC

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::str::FromStr;

use super::normalize_key;
use super::record::{Entity, Record, ValidityWindow};
use super::store::Category;
use crate::cty::{
    fields, ClublogDataset, ClublogHeader, CountryFileDataset, CountryMapping, RawRecord,
};
use crate::error::{LookupError, Result};
use crate::time_utils::parse_dataset_timestamp;

/// Everything the Club Log XML backend serves
#[derive(Debug, Clone)]
pub struct FullReferenceData {
    pub header: ClublogHeader,
    pub entities: HashMap<u16, Entity>,
    pub exceptions: Category<Record>,
    pub prefixes: Category<Record>,
    pub invalid_operations: Category<Record>,
    pub zone_exceptions: Category<Record>,
}

/// Everything the country-files.com backend serves
#[derive(Debug, Clone)]
pub struct PrefixFileData {
    pub exceptions: Category<Record>,
    pub prefixes: Category<Record>,
}

/// Typed access to one raw record, with errors that point at the culprit
struct FieldReader<'a> {
    category: &'static str,
    position: usize,
    raw: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    fn new(category: &'static str, position: usize, raw: &'a RawRecord) -> Self {
        Self {
            category,
            position,
            raw,
        }
    }

    fn corrupt(&self, field: &str, detail: &str) -> LookupError {
        LookupError::SourceCorrupt(format!(
            "{} record #{}: field '{}' {}",
            self.category, self.position, field, detail
        ))
    }

    fn text(&self, field: &str) -> Option<String> {
        self.raw.get(field).map(|s| s.trim().to_string())
    }

    fn number<T: FromStr>(&self, field: &str) -> Result<Option<T>> {
        match self.raw.get(field) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.corrupt(field, &format!("is not a valid number: '{}'", raw))),
        }
    }

    fn longitude(&self) -> Result<Option<f64>> {
        Ok(self.number::<f64>(fields::LONGITUDE)?.map(|lon| -lon))
    }

    fn flag(&self, field: &str) -> bool {
        self.raw
            .get(field)
            .map(|v| v.trim().eq_ignore_ascii_case("TRUE"))
            .unwrap_or(false)
    }

    fn timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        match self.raw.get(field) {
            None => Ok(None),
            Some(raw) => parse_dataset_timestamp(raw)
                .map(Some)
                .ok_or_else(|| self.corrupt(field, &format!("is not a timestamp: '{}'", raw))),
        }
    }

    fn window(&self, start: &str, end: &str) -> Result<ValidityWindow> {
        Ok(ValidityWindow::new(self.timestamp(start)?, self.timestamp(end)?))
    }

    fn key(&self) -> Result<String> {
        self.raw
            .call()
            .map(normalize_key)
            .ok_or_else(|| self.corrupt(fields::CALL, "is missing"))
    }

    fn record(&self) -> Result<Record> {
        Ok(Record {
            country: self.text(fields::COUNTRY),
            adif: self.number(fields::ADIF)?,
            cq_zone: self.number(fields::CQZ)?,
            itu_zone: self.number(fields::ITUZ)?,
            continent: self.text(fields::CONTINENT),
            latitude: self.number(fields::LATITUDE)?,
            longitude: self.longitude()?,
            window: self.window(fields::START, fields::END)?,
        })
    }

    fn entity(&self) -> Result<Entity> {
        let adif = self
            .number::<u16>(fields::ADIF)?
            .ok_or_else(|| self.corrupt(fields::ADIF, "is missing"))?;
        Ok(Entity {
            adif,
            country: self.text(fields::COUNTRY),
            prefix: self.text(fields::PREFIX),
            deleted: self.flag(fields::DELETED),
            cq_zone: self.number(fields::CQZ)?,
            itu_zone: self.number(fields::ITUZ)?,
            continent: self.text(fields::CONTINENT),
            latitude: self.number(fields::LATITUDE)?,
            longitude: self.longitude()?,
            window: self.window(fields::START, fields::END)?,
            whitelisted: self.flag(fields::WHITELIST),
            whitelist_window: self.window(fields::WHITELIST_START, fields::WHITELIST_END)?,
        })
    }
}

fn require_records(category: &str, records: &[RawRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(LookupError::SourceCorrupt(format!(
            "no {} found in dataset",
            category
        )));
    }
    Ok(())
}

fn build_entities(raw: &[RawRecord]) -> Result<HashMap<u16, Entity>> {
    let mut entities = HashMap::with_capacity(raw.len());
    for (position, record) in raw.iter().enumerate() {
        let entity = FieldReader::new("entity", position, record).entity()?;
        if entities.insert(entity.adif, entity).is_some() {
            log::debug!(
                "Entity record #{} replaces an earlier entity with the same ADIF id",
                position
            );
        }
    }
    log::debug!("{} entities added", entities.len());
    Ok(entities)
}

/// Build one keyed category; `check` may reject a parsed record
fn build_category<F>(
    category: &'static str,
    raw: &[RawRecord],
    check: F,
) -> Result<Category<Record>>
where
    F: Fn(&FieldReader<'_>, &Record) -> Result<()>,
{
    let mut built = Category::new();
    for (position, record) in raw.iter().enumerate() {
        let reader = FieldReader::new(category, position, record);
        let key = reader.key()?;
        let parsed = reader.record()?;
        check(&reader, &parsed)?;
        built.insert(key, parsed);
    }
    log::debug!(
        "{} {} records added, {} unique keys",
        built.len(),
        category,
        built.index().len()
    );
    Ok(built)
}

fn no_check(_: &FieldReader<'_>, _: &Record) -> Result<()> {
    Ok(())
}

/// Build the Club Log XML backend data
///
/// All five sections must be non-empty.
pub fn build_full_reference(dataset: &ClublogDataset) -> Result<FullReferenceData> {
    require_records("entities", &dataset.entities)?;
    require_records("exceptions", &dataset.exceptions)?;
    require_records("prefixes", &dataset.prefixes)?;
    require_records("invalid operations", &dataset.invalid_operations)?;
    require_records("zone exceptions", &dataset.zone_exceptions)?;

    let entities = build_entities(&dataset.entities)?;
    let exceptions = build_category("exception", &dataset.exceptions, no_check)?;
    let prefixes = build_category("prefix", &dataset.prefixes, no_check)?;
    let invalid_operations =
        build_category("invalid operation", &dataset.invalid_operations, no_check)?;
    let zone_exceptions = build_category(
        "zone exception",
        &dataset.zone_exceptions,
        |reader, record| match record.cq_zone {
            Some(_) => Ok(()),
            None => Err(reader.corrupt("zone", "is missing")),
        },
    )?;

    Ok(FullReferenceData {
        header: dataset.header.clone(),
        entities,
        exceptions,
        prefixes,
        invalid_operations,
        zone_exceptions,
    })
}

/// Build the country-files.com backend data
///
/// Entries flagged ExactCallsign become callsign exceptions, the rest
/// prefixes. With a mapping table every record gets its ADIF id and a country
/// missing from the table fails the build; without one ADIF ids stay empty.
pub fn build_prefix_file(
    dataset: &CountryFileDataset,
    mapping: Option<&CountryMapping>,
) -> Result<PrefixFileData> {
    require_records("country file entries", &dataset.records)?;

    let mut exceptions = Category::new();
    let mut prefixes = Category::new();

    for (position, raw) in dataset.records.iter().enumerate() {
        let reader = FieldReader::new("country file", position, raw);
        let key = reader.key()?;
        let mut record = reader.record()?;

        record.adif = match mapping {
            Some(table) => {
                let country = record
                    .country
                    .as_deref()
                    .ok_or_else(|| reader.corrupt(fields::COUNTRY, "is missing"))?;
                let adif = table.get(country).ok_or_else(|| {
                    reader.corrupt(
                        fields::COUNTRY,
                        &format!("'{}' has no entry in the country mapping", country),
                    )
                })?;
                Some(adif)
            }
            None => None,
        };

        if reader.flag(fields::EXACT_CALLSIGN) {
            exceptions.insert(key, record);
        } else {
            prefixes.insert(key, record);
        }
    }

    if prefixes.is_empty() {
        return Err(LookupError::SourceCorrupt(
            "no prefixes found in country file".to_string(),
        ));
    }
    if exceptions.is_empty() {
        return Err(LookupError::SourceCorrupt(
            "no exact callsign exceptions found in country file".to_string(),
        ));
    }

    log::debug!(
        "{} prefixes added ({} in index), {} exceptions added ({} in index)",
        prefixes.len(),
        prefixes.index().len(),
        exceptions.len(),
        exceptions.index().len()
    );

    Ok(PrefixFileData {
        exceptions,
        prefixes,
    })
}
