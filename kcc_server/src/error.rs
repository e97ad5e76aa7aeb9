use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kcc_core::ErrorKind;
use serde_json::json;
use tracing::error;

static ERROR_TITLE: &str = "문화행사 API 호출 실패";

/// A [`kcc_core::Error`] answered as JSON.
#[derive(Debug)]
pub struct ApiError(pub kcc_core::Error);

impl From<kcc_core::Error> for ApiError {
    fn from(err: kcc_core::Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Transport
            | ErrorKind::MalformedPayload
            | ErrorKind::SoapFault
            | ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::InvalidRecord | ErrorKind::InvalidDate => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(err = %self.0, %status, "request failed");
        let body = json!({
            "error": ERROR_TITLE,
            "message": self.0.to_string(),
            "details": self.0.upstream_code().unwrap_or(self.0.kind().as_str()),
        });
        (status, Json(body)).into_response()
    }
}
