use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failures of the history pipeline. Every variant reaches the chart as a
/// `{"S":"fail"}` envelope with HTTP 200.
#[derive(Error, Debug)]
pub enum UdfError {
    #[error("invalid `{name}` parameter {value:?}: {source}")]
    InvalidParam {
        name: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("missing `{0}` parameter")]
    MissingParam(&'static str),
    #[error("unsupported resolution {0:?}")]
    UnsupportedResolution(String),
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("failed to read upstream response body: {0}")]
    BodyRead(#[source] reqwest::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },
    #[error("upstream error {code}: {message}")]
    UpstreamStatus { code: String, message: String },
}

impl IntoResponse for UdfError {
    fn into_response(self) -> Response {
        let body = json!({ "S": "fail", "err_info": self.to_string() });
        (StatusCode::OK, axum::Json(body)).into_response()
    }
}

/// `{"S":"no_data"}`; the chart treats it as an empty range, not a failure.
pub fn no_data() -> Response {
    (StatusCode::OK, axum::Json(json!({ "S": "no_data" }))).into_response()
}
