//! Documentation generation handlers.
//!
//! POST answers with the finished document. GET streams it as server-sent
//! events: one `start`, a `chunk` per text delta (with the text so far) and
//! a final `complete`, or an `error` event.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sitepilot_runtime::{DocsRequest, sanitize_slug};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::http::handlers::required_field;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DocsParams {
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocsResponse {
    pub message: &'static str,
    pub documentation: String,
    pub original_request: String,
    pub endpoint_slug: String,
    pub website_url: Option<String>,
    pub status: &'static str,
}

type EventStream = BoxStream<'static, Result<Event, Infallible>>;

/// Resolve the website for context. A shortcut names its own endpoint when
/// none was given.
async fn docs_request(state: &AppState, request: String, endpoint: Option<&str>) -> DocsRequest {
    let resolution = state.sessions.extract_website(&request).await;
    let endpoint_slug = endpoint.and_then(sanitize_slug).or_else(|| {
        resolution
            .as_ref()
            .and_then(|r| r.shortcut.as_deref())
            .and_then(sanitize_slug)
    });
    DocsRequest {
        request,
        endpoint_slug,
        website: resolution.map(|r| r.website),
    }
}

fn data_event(value: Value) -> Event {
    Event::default().data(value.to_string())
}

fn error_event(message: &str) -> Event {
    data_event(json!({"type": "error", "error": message, "status": "error"}))
}

/// POST /generate-docs
pub async fn generate_docs(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DocsParams>, JsonRejection>,
) -> Result<Json<DocsResponse>, ApiError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let request = required_field(body.request, "request", "Request input cannot be empty")?;
    info!("Generating documentation for: {}", request);

    let docs = docs_request(&state, request, body.endpoint.as_deref()).await;
    let documentation = state.sessions.docs().generate(&docs).await?;
    Ok(Json(DocsResponse {
        message: "Documentation generated successfully",
        endpoint_slug: docs.slug().to_string(),
        documentation,
        original_request: docs.request,
        website_url: docs.website,
        status: "success",
    }))
}

/// GET /generate-docs?request=..&endpoint=..
pub async fn generate_docs_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DocsParams>,
) -> Response {
    let request = params.request.unwrap_or_default().trim().to_string();
    if request.is_empty() {
        let event = error_event("Missing 'request' parameter in query params");
        let events: EventStream = stream::once(async move { Ok(event) }).boxed();
        return Sse::new(events).into_response();
    }
    info!("Streaming documentation for: {}", request);

    let docs = docs_request(&state, request, params.endpoint.as_deref()).await;
    let events = async_stream::stream! {
        yield Ok(data_event(json!({"type": "start", "message": "Starting documentation generation..."})));

        match state.sessions.docs().generate_stream(&docs).await {
            Ok(mut parts) => {
                let mut documentation = String::new();
                let mut failed = false;
                while let Some(part) = parts.next().await {
                    match part {
                        Ok(text) => {
                            documentation.push_str(&text);
                            yield Ok(data_event(json!({
                                "type": "chunk",
                                "text": text,
                                "partial_content": documentation,
                            })));
                        }
                        Err(e) => {
                            warn!("Documentation stream failed: {}", e);
                            yield Ok(error_event(&format!("Failed to generate documentation: {}", e)));
                            failed = true;
                            break;
                        }
                    }
                }
                if !failed {
                    yield Ok(data_event(json!({
                        "type": "complete",
                        "documentation": documentation,
                        "original_request": docs.request,
                        "endpoint_slug": docs.slug(),
                        "website_url": docs.website,
                        "status": "success",
                    })));
                }
            }
            Err(e) => {
                warn!("Documentation stream could not start: {}", e);
                yield Ok(error_event(&format!("Failed to generate documentation: {}", e)));
            }
        }
    };

    let events: EventStream = events.boxed();
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
