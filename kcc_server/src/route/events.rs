use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use kcc_core::{
    calendar::{to_calendar_events, CalendarEvent},
    culture_client::{CultureClient, EventQuery},
    envelope::Pagination,
    event::CulturalEvent,
    realm::RealmBitmask,
};
use serde::Serialize;

use crate::{
    error::ApiError,
    route::{query_params, QueryParams},
};

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    success: bool,
    message: String,
    data: EventsData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsData {
    period: Option<String>,
    region: Option<String>,
    total_count: usize,
    pagination: Pagination,
    events: Vec<CulturalEvent>,
    calendar_events: Vec<CalendarEvent>,
}

/// Handle event listing requests, answering with the events and their calendar projection.
pub async fn handler(
    State(client): State<CultureClient>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<EventsResponse>, ApiError> {
    let query_params = query_params(query)?;
    let query = EventQuery::try_from(&query_params)?;
    let excluded_realms = RealmBitmask::from(&query_params);
    let page = client.fetch_page(&query).await?;
    let events: Vec<CulturalEvent> = page
        .events
        .into_iter()
        .filter(|event| !event.realm().is_excluded(excluded_realms))
        .collect();
    let calendar_events = to_calendar_events(&events)?;
    let period = match (query_params.from, query_params.to) {
        (None, None) => None,
        (from, to) => Some(format!(
            "{} ~ {}",
            from.unwrap_or_default(),
            to.unwrap_or_default()
        )),
    };
    let region = match (query.sido, query.gugun) {
        (Some(sido), Some(gugun)) => Some(format!("{sido} {gugun}")),
        (sido, _) => sido,
    };
    Ok(Json(EventsResponse {
        success: true,
        message: format!("{}개의 문화행사 데이터를 성공적으로 조회했습니다.", events.len()),
        data: EventsData {
            period,
            region,
            total_count: events.len(),
            pagination: page.pagination,
            events,
            calendar_events,
        },
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{
        app,
        tests::{upstream_client, LISTING, RESULT_CODE_ERROR},
    };

    async fn get_json(client: kcc_core::culture_client::CultureClient, uri: &str) -> (StatusCode, Value) {
        let response = app(client)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_events() {
        let client = upstream_client(LISTING).await;
        let (status, json) = get_json(client, "/events?from=20250601&to=20250630").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["period"], "20250601 ~ 20250630");
        assert_eq!(json["data"]["totalCount"], 2);
        assert_eq!(json["data"]["pagination"]["totalCount"], 2);
        assert_eq!(json["data"]["events"][0]["seq"], "312345");
        assert_eq!(json["data"]["calendarEvents"][0]["start"], "2025-06-10");
        assert_eq!(json["data"]["calendarEvents"][0]["end"], "2025-06-13");
        assert_eq!(json["data"]["calendarEvents"][1]["backgroundColor"], "#3B82F6");
    }

    #[tokio::test]
    async fn test_events_exclusion() {
        let client = upstream_client(LISTING).await;
        let (_, json) = get_json(client, "/events?exclude_music=true").await;
        assert_eq!(json["data"]["totalCount"], 1);
        assert_eq!(json["data"]["events"][0]["realmName"], "연극");
    }

    #[tokio::test]
    async fn test_events_upstream_error() {
        let client = upstream_client(RESULT_CODE_ERROR).await;
        let (status, json) = get_json(client, "/events").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["details"], "99");
        assert_eq!(json["error"], "문화행사 API 호출 실패");
    }

    #[tokio::test]
    async fn test_events_undecodable_query() {
        let client = upstream_client(LISTING).await;
        let (status, json) = get_json(client, "/events?num_of_rows=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "문화행사 API 호출 실패");
        assert_eq!(json["details"], "invalid_request");
        assert!(json["message"].as_str().unwrap().starts_with("invalid request"));
    }
}
