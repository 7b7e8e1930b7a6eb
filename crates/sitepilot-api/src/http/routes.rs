//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::{docs, endpoints, handlers, monitoring};
use crate::state::AppState;

/// Create the router.
///
/// ```text
/// GET  /                  - Service description
/// GET  /health            - Health check
/// POST /navigate          - Open a website described in natural language
/// POST /extract-website   - Resolve the website only
/// POST /create-endpoint   - Scrape a page into /{slug} (202)
/// POST /refresh-endpoint  - Re-scrape /{slug} (202)
/// POST /generate-docs     - Markdown docs as JSON
/// GET  /generate-docs     - Markdown docs as server-sent events
/// GET  /{slug}            - Cached JSON for a scraped endpoint
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(monitoring::service_info))
        .route("/health", get(monitoring::health_check))
        .route("/navigate", post(handlers::navigate))
        .route("/extract-website", post(handlers::extract_website))
        .route("/create-endpoint", post(endpoints::create_endpoint))
        .route("/refresh-endpoint", post(endpoints::refresh_endpoint))
        .route(
            "/generate-docs",
            post(docs::generate_docs).get(docs::generate_docs_stream),
        )
        .route("/{slug}", get(endpoints::serve_endpoint))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
