use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use kcc_core::{
    culture_client::{CultureClient, EventQuery},
    ical::generator::Emitter,
    realm::RealmBitmask,
};

use crate::{
    error::ApiError,
    route::{query_params, QueryParams},
};

/// Handle calendar requests.
///
/// All query parameters are optional, see [`QueryParams`].
pub async fn handler(
    State(client): State<CultureClient>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query_params = query_params(query)?;
    let query = EventQuery::try_from(&query_params)?;
    let ical_calendar = client
        .get_ical_calendar(&query, RealmBitmask::from(&query_params))
        .await?;
    let response = ([(CONTENT_TYPE, "text/calendar")], ical_calendar.generate()).into_response();
    Ok(response)
}
