//! This client fetches cultural events and parses them into normalized events.

use std::{fmt, str::FromStr, time::Duration};

use chrono::NaiveDate;
use ical::generator::IcalCalendar;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    calendar::{to_calendar_events, CalendarEvent},
    envelope::{self, Pagination},
    error::{Error, Result},
    event::{map_records, CulturalEvent},
    ics,
    realm::RealmBitmask,
    xml,
};

pub static URL: &str = "https://apis.data.go.kr/B553457/nopenapi/rest/publicperformancedisplays";
pub static TIMEOUT: Duration = Duration::from_secs(10);
static FORMAT: &str = "%Y%m%d";

pub const MAX_ROWS: u32 = 100;
pub const DEFAULT_ROWS: u32 = 50;

/// The order of the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Registered,
    Title,
    Region,
    #[default]
    StartDate,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Registered => "1",
            SortOrder::Title => "2",
            SortOrder::Region => "3",
            SortOrder::StartDate => "4",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "1" | "registered" => Ok(SortOrder::Registered),
            "2" | "title" => Ok(SortOrder::Title),
            "3" | "region" => Ok(SortOrder::Region),
            "4" | "start-date" | "start_date" => Ok(SortOrder::StartDate),
            _ => Err(Error::InvalidRequest(format!("unknown sort order {value:?}"))),
        }
    }
}

/// The upstream classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classify {
    Theater,
    Music,
    Dance,
    FineArt,
    Architecture,
    Film,
    Literature,
    General,
}

impl Classify {
    pub fn as_param(&self) -> &'static str {
        match self {
            Classify::Theater => "A000",
            Classify::Music => "B000",
            Classify::Dance => "C000",
            Classify::FineArt => "D000",
            Classify::Architecture => "E000",
            Classify::Film => "F000",
            Classify::Literature => "G000",
            Classify::General => "H000",
        }
    }
}

impl FromStr for Classify {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "A000" | "THEATER" => Ok(Classify::Theater),
            "B000" | "MUSIC" => Ok(Classify::Music),
            "C000" | "DANCE" => Ok(Classify::Dance),
            "D000" | "FINE-ART" | "FINE_ART" => Ok(Classify::FineArt),
            "E000" | "ARCHITECTURE" => Ok(Classify::Architecture),
            "F000" | "FILM" => Ok(Classify::Film),
            "G000" | "LITERATURE" => Ok(Classify::Literature),
            "H000" | "GENERAL" => Ok(Classify::General),
            _ => Err(Error::InvalidRequest(format!("unknown classification {value:?}"))),
        }
    }
}

/// The parameters of a listing request, without the service key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub num_of_rows: u32,
    pub page_no: u32,
    pub sort: SortOrder,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sido: Option<String>,
    pub gugun: Option<String>,
    pub classify: Option<Classify>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            num_of_rows: DEFAULT_ROWS,
            page_no: 1,
            sort: SortOrder::default(),
            from: None,
            to: None,
            sido: None,
            gugun: None,
            classify: None,
        }
    }
}

impl EventQuery {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ROWS).contains(&self.num_of_rows) {
            return Err(Error::InvalidRequest(format!(
                "numOfRows must be between 1 and {MAX_ROWS}, got {}",
                self.num_of_rows
            )));
        }
        if self.page_no == 0 {
            return Err(Error::InvalidRequest(String::from("pageNo starts at 1")));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(Error::InvalidRequest(format!(
                    "period starts after it ends: {from} > {to}"
                )));
            }
        }
        Ok(())
    }

    /// The query string pairs, service key excluded.
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("numOfRows", self.num_of_rows.to_string()),
            ("pageNo", self.page_no.to_string()),
            ("sortStdr", String::from(self.sort.as_param())),
        ];
        if let Some(from) = self.from {
            params.push(("from", from.format(FORMAT).to_string()));
        }
        if let Some(to) = self.to {
            params.push(("to", to.format(FORMAT).to_string()));
        }
        if let Some(sido) = &self.sido {
            params.push(("sido", sido.clone()));
        }
        if let Some(gugun) = &self.gugun {
            params.push(("gugun", gugun.clone()));
        }
        if let Some(classify) = self.classify {
            params.push(("classify", String::from(classify.as_param())));
        }
        params
    }
}

/// One page of the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPage {
    pub events: Vec<CulturalEvent>,
    pub pagination: Pagination,
}

/// A client for the public performance listing.
///
/// The client only holds its configuration and may be cloned and shared freely.
#[derive(Clone)]
pub struct CultureClient {
    service_key: String,
    url: String,
    client: reqwest::Client,
}

impl fmt::Debug for CultureClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CultureClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl CultureClient {
    pub fn new(service_key: impl Into<String>) -> Result<Self> {
        Self::with_options(service_key, URL, TIMEOUT)
    }

    pub fn with_options(
        service_key: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            service_key: service_key.into(),
            url: url.into(),
            client,
        })
    }

    /// Fetch one page of events.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_page(&self, query: &EventQuery) -> Result<EventPage> {
        query.validate()?;
        let params = query.to_params();
        debug!(?params, "requesting cultural events");
        let body = self.get_response(&params).await?;
        let raw_page = envelope::normalize(xml::parse(&body)?)?;
        let mut events = map_records(&raw_page.records)?;
        let rows = query.num_of_rows as usize;
        if events.len() > rows {
            warn!(
                received = events.len(),
                rows, "upstream returned more events than requested"
            );
            events.truncate(rows);
        }
        if events.is_empty() {
            debug!("no cultural events found");
        } else {
            info!(count = events.len(), "fetched cultural events");
        }
        Ok(EventPage {
            events,
            pagination: raw_page.pagination,
        })
    }

    /// Get the body of the listing response.
    async fn get_response(&self, params: &[(&'static str, String)]) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("serviceKey", self.service_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    pub async fn get_events(&self, query: &EventQuery) -> Result<Vec<CulturalEvent>> {
        Ok(self.fetch_page(query).await?.events)
    }

    /// Get the events of a province (`sido`, e.g. "서울특별시") and optionally a district.
    pub async fn get_events_by_region(
        &self,
        sido: &str,
        gugun: Option<&str>,
        query: &EventQuery,
    ) -> Result<Vec<CulturalEvent>> {
        let query = EventQuery {
            sido: Some(String::from(sido)),
            gugun: gugun.map(String::from),
            ..query.clone()
        };
        self.get_events(&query).await
    }

    /// Get the events running within a period.
    pub async fn get_events_by_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        query: &EventQuery,
    ) -> Result<Vec<CulturalEvent>> {
        let query = EventQuery {
            from: Some(from),
            to: Some(to),
            ..query.clone()
        };
        self.get_events(&query).await
    }

    pub async fn get_calendar_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        to_calendar_events(&self.get_events(query).await?)
    }

    /// Get the events as an iCalendar, labelled with the region if there is one.
    pub async fn get_ical_calendar(
        &self,
        query: &EventQuery,
        excluded_realms: RealmBitmask,
    ) -> Result<IcalCalendar> {
        let events = self.get_events(query).await?;
        ics::get_calendar(&events, excluded_realms, query.sido.as_deref())
    }
}
