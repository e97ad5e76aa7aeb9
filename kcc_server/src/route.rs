pub mod calendar;
pub mod events;

use std::str::FromStr;

use axum::extract::{rejection::QueryRejection, Query};
use chrono::NaiveDate;
use kcc_core::{
    culture_client::{Classify, EventQuery, SortOrder, DEFAULT_ROWS},
    realm::RealmBitmask,
    Error,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    /// YYYYMMDD
    from: Option<String>,
    /// YYYYMMDD
    to: Option<String>,
    sido: Option<String>,
    gugun: Option<String>,
    classify: Option<String>,
    num_of_rows: Option<u32>,
    page_no: Option<u32>,
    sort: Option<String>,
    #[serde(default)]
    exclude_theater: bool,
    #[serde(default)]
    exclude_musical: bool,
    #[serde(default)]
    exclude_concert: bool,
    #[serde(default)]
    exclude_music: bool,
    #[serde(default)]
    exclude_dance: bool,
    #[serde(default)]
    exclude_fine_art: bool,
    #[serde(default)]
    exclude_exhibition: bool,
    #[serde(default)]
    exclude_literature: bool,
    #[serde(default)]
    exclude_film: bool,
    #[serde(default)]
    exclude_other: bool,
}

impl From<&QueryParams> for RealmBitmask {
    fn from(value: &QueryParams) -> Self {
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

impl TryFrom<&QueryParams> for EventQuery {
    type Error = Error;

    fn try_from(value: &QueryParams) -> Result<Self, Self::Error> {
        let query = EventQuery {
            num_of_rows: value.num_of_rows.unwrap_or(DEFAULT_ROWS),
            page_no: value.page_no.unwrap_or(1),
            sort: value
                .sort
                .as_deref()
                .map(SortOrder::from_str)
                .transpose()?
                .unwrap_or_default(),
            from: value.from.as_deref().map(parse_date).transpose()?,
            to: value.to.as_deref().map(parse_date).transpose()?,
            sido: value.sido.clone().filter(|sido| !sido.is_empty()),
            gugun: value.gugun.clone().filter(|gugun| !gugun.is_empty()),
            classify: value
                .classify
                .as_deref()
                .map(Classify::from_str)
                .transpose()?,
        };
        query.validate()?;
        Ok(query)
    }
}

/// Unwrap the query string, answering an undecodable one like any other invalid request.
pub fn query_params(
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<QueryParams, ApiError> {
    query
        .map(|Query(query_params)| query_params)
        .map_err(|rejection| ApiError(Error::InvalidRequest(rejection.body_text())))
}

fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| Error::InvalidRequest(format!("expected a YYYYMMDD date, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_params_for_excluded_realms() {
        let query_params = QueryParams::default();
        assert_eq!(RealmBitmask::from(&query_params), RealmBitmask::none());
        let query_params = QueryParams {
            exclude_theater: true,
            ..Default::default()
        };
        assert_eq!(RealmBitmask::from(&query_params), RealmBitmask::Theater);
        let query_params = QueryParams {
            exclude_concert: true,
            exclude_dance: true,
            exclude_film: true,
            ..Default::default()
        };
        assert_eq!(
            RealmBitmask::from(&query_params),
            RealmBitmask::Concert
                .or(RealmBitmask::Dance)
                .or(RealmBitmask::Film)
        );
    }

    #[test]
    fn test_try_from_query_params_for_event_query() {
        let query = EventQuery::try_from(&QueryParams::default()).unwrap();
        assert_eq!(query, EventQuery::default());

        let query_params = QueryParams {
            from: Some(String::from("20250601")),
            to: Some(String::from("20250630")),
            sido: Some(String::from("서울특별시")),
            gugun: Some(String::new()),
            classify: Some(String::from("D000")),
            num_of_rows: Some(100),
            sort: Some(String::from("1")),
            ..Default::default()
        };
        let query = EventQuery::try_from(&query_params).unwrap();
        assert_eq!(query.from, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(query.to, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(query.sido.as_deref(), Some("서울특별시"));
        assert_eq!(query.gugun, None);
        assert_eq!(query.classify, Some(Classify::FineArt));
        assert_eq!(query.num_of_rows, 100);
        assert_eq!(query.sort, SortOrder::Registered);
    }

    #[test]
    fn test_try_from_invalid_query_params() {
        for query_params in [
            QueryParams {
                from: Some(String::from("2025-06-01")),
                ..Default::default()
            },
            QueryParams {
                num_of_rows: Some(101),
                ..Default::default()
            },
            QueryParams {
                sort: Some(String::from("9")),
                ..Default::default()
            },
            QueryParams {
                classify: Some(String::from("X000")),
                ..Default::default()
            },
        ] {
            let err = EventQuery::try_from(&query_params).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{query_params:?}");
        }
    }
}
