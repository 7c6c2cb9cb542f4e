use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use valuation::{estimate, PropertyAttributes, ValuationResult};

use crate::errors::ApiError;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Run the heuristic over whatever subset of attributes the caller
/// supplied. Unknown keys are ignored and wrong-typed optional fields
/// skip their adjustment, so any JSON object yields a 200.
async fn valuate(
    payload: Result<Json<PropertyAttributes>, JsonRejection>,
) -> Result<Json<ValuationResult>, ApiError> {
    let Json(fields) = payload?;
    Ok(Json(estimate(&fields)))
}

/// Build the full application router: health probe plus the valuation API
pub fn build_router(cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/valuation", post(valuate))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
