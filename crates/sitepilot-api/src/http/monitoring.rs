//! Service info and health check handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

pub const SERVICE_NAME: &str = "SitePilot";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub busy: bool,
    pub uptime_seconds: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        busy: state.sessions.gate().is_busy(),
        uptime_seconds: state.uptime().as_secs(),
    })
}

pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "SitePilot desktop agent API",
        "status": "running",
        "description": "Drives the Mac through Spotlight to open websites described in natural language, and turns scraped pages into JSON endpoints",
        "features": {
            "natural_language": "Requests like 'Navigate to Google' or 'Go to GitHub'",
            "direct_urls": "Direct URLs like 'google.com' or 'https://example.com'",
            "computer_control": "Controls the Mac via the Spotlight overlay",
        },
        "endpoints": {
            "health": "/health - Health check",
            "navigate": "/navigate (POST) - Navigate to a website from natural language or a URL",
            "extract-website": "/extract-website (POST) - Extract the website without navigating",
            "create-endpoint": "/create-endpoint (POST) - Scrape a page into a JSON endpoint",
            "refresh-endpoint": "/refresh-endpoint (POST) - Re-scrape an existing endpoint",
            "generate-docs": "/generate-docs (POST, or GET for SSE) - Markdown docs for an endpoint",
        },
        "registered_endpoints": state.sessions.store().slugs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
