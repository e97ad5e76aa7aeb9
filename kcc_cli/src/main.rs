use std::{env::current_dir, fs::write, time::Duration};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use kcc_core::{
    calendar::{to_calendar_events, CalendarEvent},
    culture_client::{Classify, CultureClient, EventQuery, SortOrder, DEFAULT_ROWS, URL},
    event::CulturalEvent,
    ical::generator::Emitter,
    ics,
    realm::RealmBitmask,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

static PLACEHOLDER_KEY: &str = "your_culture_api_key_here";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// write calendar.ics
    Ics,
    /// write events.json with the events and their calendar projection
    Json,
}

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the service key issued by data.go.kr
    #[arg(long, env = "CULTURE_API_KEY", hide_env_values = true)]
    pub service_key: String,
    /// the first day of the period, YYYYMMDD
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    /// the last day of the period, YYYYMMDD
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
    /// the province, e.g. 서울특별시
    #[arg(long)]
    pub sido: Option<String>,
    /// the district, e.g. 종로구
    #[arg(long)]
    pub gugun: Option<String>,
    /// the classification code, A000 to H000
    #[arg(long)]
    pub classify: Option<Classify>,
    /// the number of events per page, at most 100
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: u32,
    /// the page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// the sort order: 1 registered, 2 title, 3 region, 4 start date
    #[arg(long, default_value = "4")]
    pub sort: SortOrder,
    /// the request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
    /// the output format
    #[arg(long, value_enum, default_value_t = Format::Ics)]
    pub format: Format,
    /// exclude theater events
    #[arg(long)]
    pub exclude_theater: bool,
    /// exclude musical events
    #[arg(long)]
    pub exclude_musical: bool,
    /// exclude concert events
    #[arg(long)]
    pub exclude_concert: bool,
    /// exclude music events
    #[arg(long)]
    pub exclude_music: bool,
    /// exclude dance events
    #[arg(long)]
    pub exclude_dance: bool,
    /// exclude fine art events
    #[arg(long)]
    pub exclude_fine_art: bool,
    /// exclude exhibitions
    #[arg(long)]
    pub exclude_exhibition: bool,
    /// exclude literature events
    #[arg(long)]
    pub exclude_literature: bool,
    /// exclude film screenings
    #[arg(long)]
    pub exclude_film: bool,
    /// exclude events of any other realm
    #[arg(long)]
    pub exclude_other: bool,
}

impl From<&Arguments> for RealmBitmask {
    fn from(value: &Arguments) -> Self {
        let mut realm_bitmask = RealmBitmask::none();
        for (excluded, realm) in [
            (value.exclude_theater, RealmBitmask::Theater),
            (value.exclude_musical, RealmBitmask::Musical),
            (value.exclude_concert, RealmBitmask::Concert),
            (value.exclude_music, RealmBitmask::Music),
            (value.exclude_dance, RealmBitmask::Dance),
            (value.exclude_fine_art, RealmBitmask::FineArt),
            (value.exclude_exhibition, RealmBitmask::Exhibition),
            (value.exclude_literature, RealmBitmask::Literature),
            (value.exclude_film, RealmBitmask::Film),
            (value.exclude_other, RealmBitmask::Other),
        ] {
            if excluded {
                realm_bitmask |= realm;
            }
        }
        realm_bitmask
    }
}

impl From<&Arguments> for EventQuery {
    fn from(value: &Arguments) -> Self {
        EventQuery {
            num_of_rows: value.rows,
            page_no: value.page,
            sort: value.sort,
            from: value.from,
            to: value.to,
            sido: value.sido.clone(),
            gugun: value.gugun.clone(),
            classify: value.classify,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventsDocument {
    events: Vec<CulturalEvent>,
    calendar_events: Vec<CalendarEvent>,
}

fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
}

fn check_service_key(service_key: &str) -> Result<()> {
    if service_key.trim().is_empty() || service_key == PLACEHOLDER_KEY {
        bail!("no service key configured, set CULTURE_API_KEY to the key issued by data.go.kr");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Arguments::parse();
    check_service_key(&args.service_key)?;
    let client = CultureClient::with_options(
        args.service_key.as_str(),
        URL,
        Duration::from_secs(args.timeout),
    )?;
    let query = EventQuery::from(&args);
    let events = client.get_events(&query).await?;
    let mut path = current_dir()?;
    match args.format {
        Format::Ics => {
            let calendar = ics::get_calendar(
                &events,
                RealmBitmask::from(&args),
                query.sido.as_deref(),
            )?;
            path.push("calendar.ics");
            write(&path, calendar.generate())?;
        }
        Format::Json => {
            let excluded = RealmBitmask::from(&args);
            let events: Vec<CulturalEvent> = events
                .into_iter()
                .filter(|event| !event.realm().is_excluded(excluded))
                .collect();
            let document = EventsDocument {
                calendar_events: to_calendar_events(&events)?,
                events,
            };
            path.push("events.json");
            write(&path, serde_json::to_string_pretty(&document)?)?;
        }
    }
    info!(path = %path.display(), "calendar written");
    Ok(())
}
