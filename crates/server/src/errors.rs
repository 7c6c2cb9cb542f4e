use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Error surface of the valuation API.
///
/// The engine itself is total, so the only failure mode is a request
/// body that never reaches it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::BadRequest(rej.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let msg = self.to_string();
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
