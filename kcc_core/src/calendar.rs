//! Projection of cultural events into calendar display events.
//!
//! The projection follows the FullCalendar event object: all-day events with an exclusive end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    event::CulturalEvent,
    realm::TEXT_COLOR,
};

static DISPLAY_FORMAT: &str = "%Y-%m-%d";
static DATE_FORMATS: [&str; 3] = ["%Y%m%d", "%Y-%m-%d", "%Y.%m.%d"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// First day, `YYYY-MM-DD`.
    pub start: String,
    /// The day after the last day, `YYYY-MM-DD`.
    pub end: String,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub extended_props: ExtendedProps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProps {
    pub place: String,
    pub area: String,
    pub realm_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub original_data: CulturalEvent,
}

impl CalendarEvent {
    /// Project an event. Missing dates fall back to `today`.
    pub fn from_event(event: &CulturalEvent, today: NaiveDate) -> Result<CalendarEvent> {
        let (start, end) = date_range(event, today)?;
        let color = event.realm().color();
        Ok(CalendarEvent {
            id: event.seq.clone(),
            title: event.title.clone(),
            start: start.format(DISPLAY_FORMAT).to_string(),
            end: end.format(DISPLAY_FORMAT).to_string(),
            background_color: String::from(color),
            border_color: String::from(color),
            text_color: String::from(TEXT_COLOR),
            extended_props: ExtendedProps {
                place: event.place.clone(),
                area: event.area.clone(),
                realm_name: event.realm_name.clone(),
                thumbnail: event.thumbnail.clone(),
                original_data: event.clone(),
            },
        })
    }
}

/// Project events in order, falling back to the local date for missing dates.
pub fn to_calendar_events(events: &[CulturalEvent]) -> Result<Vec<CalendarEvent>> {
    let today = chrono::Local::now().date_naive();
    events
        .iter()
        .map(|event| CalendarEvent::from_event(event, today))
        .collect()
}

/// The first day and the exclusive end of an event.
pub fn date_range(event: &CulturalEvent, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(&event.start_date)?.unwrap_or(today);
    let last = parse_date(&event.end_date)?.unwrap_or(today);
    let end = last
        .succ_opt()
        .ok_or_else(|| Error::InvalidDate(event.end_date.clone()))?;
    Ok((start, end))
}

/// Read an upstream date. An empty string is no date.
pub fn parse_date(date: &str) -> Result<Option<NaiveDate>> {
    let date = date.trim();
    if date.is_empty() {
        return Ok(None);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
        .map(Some)
        .ok_or_else(|| Error::InvalidDate(date.to_string()))
}
