//! Export of cultural events as an iCalendar.

use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_param, ical_property,
};
use regex::Regex;

use crate::{
    calendar::date_range,
    error::Result,
    event::CulturalEvent,
    realm::RealmBitmask,
};

static PROD_ID: [&str; 2] = ["문화행사달력", "data.go.kr"];
static TIMEZONE: &str = "Asia/Seoul";
static FORMAT: &str = "%Y%m%d";

/// Build the calendar from the events, leaving out the excluded realms.
///
/// The `label`, e.g. the region, becomes part of the product identifier.
pub fn get_calendar(
    events: &[CulturalEvent],
    excluded_realms: RealmBitmask,
    label: Option<&str>,
) -> Result<IcalCalendar> {
    let today = chrono::Local::now().date_naive();
    let changed = chrono::Local::now().format("%Y%m%dT%H%M%S").to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(prod_id(label))
        .build();
    for event in events {
        if event.realm().is_excluded(excluded_realms) {
            continue;
        }
        calendar
            .events
            .push(get_event(event, &changed, today)?);
    }
    Ok(calendar)
}

/// Build an all-day event spanning the event's dates.
fn get_event(event: &CulturalEvent, changed: &str, today: chrono::NaiveDate) -> Result<IcalEvent> {
    let (start, end) = date_range(event, today)?;
    let mut builder = IcalEventBuilder::tzid(TIMEZONE)
        .uid(uid(event))
        .changed(changed)
        .one_day(start.format(FORMAT).to_string())
        .set(ical_property!(
            "DTEND",
            end.format(FORMAT).to_string(),
            ical_param!("VALUE", "DATE")
        ))
        .set(ical_property!("SUMMARY", &event.title))
        .set(ical_property!("TRANSP", "TRANSPARENT"));
    if let Some(location) = location(event) {
        builder = builder.set(ical_property!("LOCATION", location));
    }
    if !event.realm_name.is_empty() {
        builder = builder.set(ical_property!("CATEGORIES", &event.realm_name));
    }
    if let Some(description) = description(event) {
        builder = builder.set(ical_property!("DESCRIPTION", description));
    }
    if let Some(homepage) = &event.homepage {
        builder = builder.set(ical_property!("URL", homepage));
    }
    Ok(builder.build())
}

fn location(event: &CulturalEvent) -> Option<String> {
    let parts: Vec<&str> = [event.place.trim(), event.area.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn description(event: &CulturalEvent) -> Option<String> {
    let lines: Vec<&str> = [&event.ticket, &event.performer, &event.program]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect();
    (!lines.is_empty()).then(|| lines.join(" / "))
}

fn prod_id(label: Option<&str>) -> String {
    let mut strings: Vec<String> = Vec::from(PROD_ID).into_iter().map(String::from).collect();
    if let Some(label) = label {
        strings.splice(0..0, [String::from(label)]);
    }
    strings.splice(0..0, [String::from("-")]);
    strings.join("//")
}

/// Get a unique id for a cultural event.
///
/// Changing this function is a breaking change!
fn uid(event: &CulturalEvent) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let key = if event.seq.is_empty() {
        &event.title
    } else {
        &event.seq
    };
    let key = whitespace_regex.replace_all(key.trim(), "-");
    format!("{}_{key}@{}", PROD_ID[0], PROD_ID[1])
}
