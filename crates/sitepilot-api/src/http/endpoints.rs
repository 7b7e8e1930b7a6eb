//! Scraped endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EndpointRequest {
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

type Accepted = (StatusCode, Json<Value>);

fn start_scrape(state: &AppState, request: &str, endpoint: &str) -> Result<Accepted, ApiError> {
    if state.sessions.gate().is_busy() {
        return Err(ApiError::Busy);
    }
    if request.trim().is_empty() || endpoint.trim().is_empty() {
        return Err(ApiError::BadRequest("Both 'request' and 'endpoint' are required.".to_string()));
    }

    let started = state.sessions.start_scrape(request, endpoint)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!("Endpoint creation for '/{}' started.", started.slug),
            "endpoint": started.slug,
            "status": "started",
        })),
    ))
}

/// POST /create-endpoint
pub async fn create_endpoint(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EndpointRequest>, JsonRejection>,
) -> Result<Accepted, ApiError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    start_scrape(
        &state,
        body.request.as_deref().unwrap_or_default(),
        body.endpoint.as_deref().unwrap_or_default(),
    )
}

/// POST /refresh-endpoint
///
/// Without a `request`, the endpoint is re-scraped from a generic refresh
/// request naming the slug.
pub async fn refresh_endpoint(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EndpointRequest>, JsonRejection>,
) -> Result<Accepted, ApiError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let endpoint = body.endpoint.unwrap_or_default().trim().to_lowercase();
    if endpoint.is_empty() {
        return Err(ApiError::BadRequest("'endpoint' field is required".to_string()));
    }

    let request = body
        .request
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("Refresh the data behind the /{} endpoint", endpoint));
    start_scrape(&state, &request, &endpoint)
}

/// GET /{slug}
pub async fn serve_endpoint(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    debug!("Serving endpoint '/{}'", slug);
    Ok(Json(state.sessions.store().load(&slug)?))
}
