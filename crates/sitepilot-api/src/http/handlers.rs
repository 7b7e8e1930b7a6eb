//! Navigation and website extraction handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitepilot_runtime::ExtractionMethod;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub const CONTROL_WARNING: &str =
    "The agent is now controlling your computer. Move mouse to top-left corner to emergency stop.";

#[derive(Debug, Default, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub message: String,
    pub original_input: String,
    pub extracted_website: String,
    pub target_url: String,
    pub extraction_method: ExtractionMethod,
    pub status: &'static str,
    pub warning: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Pull a required, non-empty string field out of a JSON body.
pub(crate) fn required_field(
    value: Option<String>,
    name: &str,
    empty_message: &str,
) -> Result<String, ApiError> {
    let value = value.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing '{}' parameter in request body", name))
    })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(empty_message.to_string()));
    }
    Ok(value.to_string())
}

/// POST /navigate
pub async fn navigate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NavigateRequest>, JsonRejection>,
) -> Result<Json<NavigateResponse>, ApiError> {
    if state.sessions.gate().is_busy() {
        return Err(ApiError::Busy);
    }
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let input = required_field(body.website, "website", "Website input cannot be empty")?;
    info!("Navigate request: {}", input);

    let started = state.sessions.start_navigation(&input).await?;
    let resolution = started.resolution;
    Ok(Json(NavigateResponse {
        message: format!("Navigation to {} started successfully", resolution.website),
        original_input: started.original_input,
        extracted_website: resolution.website,
        target_url: resolution.target_url,
        extraction_method: resolution.method,
        status: "started",
        warning: CONTROL_WARNING,
    }))
}

/// POST /extract-website
pub async fn extract_website(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let input = required_field(body.text, "text", "Text input cannot be empty")?;

    let response = match state.sessions.extract_website(&input).await {
        Some(resolution) => Json(json!({
            "message": "Website extracted successfully",
            "original_input": input,
            "extracted_website": resolution.website,
            "target_url": resolution.target_url,
            "extraction_method": resolution.method,
            "status": "success",
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Could not identify a website from the input",
                "original_input": input,
                "extracted_website": null,
                "extraction_method": ExtractionMethod::ModelExtraction,
                "status": "failed",
            })),
        )
            .into_response(),
    };
    Ok(response)
}
