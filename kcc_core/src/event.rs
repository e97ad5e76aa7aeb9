//! The normalized cultural event and the mapping from raw upstream records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    realm::Realm,
};

/// An untyped record as found under `body.items.item`.
pub type RawApiRecord = Map<String, Value>;

pub static UNTITLED: &str = "제목 없음";

/// A single performance or exhibition.
///
/// Dates are kept as the upstream sends them, usually `YYYYMMDD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalEvent {
    pub seq: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub place: String,
    pub realm_name: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_addr_old: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtl_contents: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_object: Option<String>,
}

impl CulturalEvent {
    pub fn realm(&self) -> Realm {
        Realm::classify(&self.realm_name)
    }
}

impl TryFrom<&Value> for CulturalEvent {
    type Error = Error;

    fn try_from(raw: &Value) -> Result<Self> {
        let Value::Object(record) = raw else {
            return Err(Error::InvalidRecord(format!(
                "expected an object, got {}",
                value_type(raw)
            )));
        };
        Ok(CulturalEvent::from(record))
    }
}

impl From<&RawApiRecord> for CulturalEvent {
    fn from(record: &RawApiRecord) -> Self {
        let optional = |key: &str| record.get(key).and_then(coerce);
        let required = |key: &str, default: &str| {
            optional(key).unwrap_or_else(|| String::from(default))
        };
        CulturalEvent {
            seq: required("seq", ""),
            title: required("title", UNTITLED),
            start_date: required("startDate", ""),
            end_date: required("endDate", ""),
            place: required("place", ""),
            realm_name: required("realmName", ""),
            area: required("area", ""),
            sub_area: optional("subArea"),
            thumbnail: optional("thumbnail"),
            gps_x: optional("gpsX"),
            gps_y: optional("gpsY"),
            place_url: optional("placeUrl"),
            phone: optional("phone"),
            place_addr: optional("placeAddr"),
            place_addr_old: optional("placeAddrOld"),
            homepage: optional("homepage"),
            ticket: optional("ticket"),
            performer: optional("performer"),
            program: optional("program"),
            dtl_contents: optional("dtlContents"),
            image_object: optional("imageObject"),
        }
    }
}

/// Coerce any field value to a string. Null and empty strings count as missing.
fn coerce(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(values) => values
            .iter()
            .filter_map(coerce)
            .collect::<Vec<String>>()
            .join(","),
        // an element carrying attributes keeps its text under "_"
        Value::Object(object) => match object.get("_") {
            Some(text) => return coerce(text),
            None => value.to_string(),
        },
    };
    (!text.is_empty()).then_some(text)
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Map raw records to events, failing on the first record which is not an object.
pub fn map_records(raw_records: &[Value]) -> Result<Vec<CulturalEvent>> {
    raw_records.iter().map(CulturalEvent::try_from).collect()
}

/// The outcome of mapping records one by one.
#[derive(Debug, Default)]
pub struct MappedRecords {
    pub events: Vec<CulturalEvent>,
    /// The index of each rejected record with the reason.
    pub failures: Vec<(usize, Error)>,
}

/// Map raw records to events, collecting the records which could not be mapped instead of failing.
pub fn map_records_partitioned(raw_records: &[Value]) -> MappedRecords {
    let mut mapped = MappedRecords::default();
    for (index, raw) in raw_records.iter().enumerate() {
        match CulturalEvent::try_from(raw) {
            Ok(event) => mapped.events.push(event),
            Err(err) => mapped.failures.push((index, err)),
        }
    }
    mapped
}
