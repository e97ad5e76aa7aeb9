//! This crate fetches Korean cultural event listings from the public performance open data API
//! and turns them into calendar events.
//!
//! The listings are read from <https://apis.data.go.kr/B553457/nopenapi/rest/publicperformancedisplays>.

pub use ical;

pub mod calendar;
pub mod culture_client;
pub mod envelope;
pub mod error;
pub mod event;
pub mod ics;
pub mod realm;
pub mod xml;

pub use error::{Error, ErrorKind, Result};
