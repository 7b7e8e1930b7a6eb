//! # SitePilot API
//!
//! HTTP surface of the SitePilot agent.
//!
//! - **Navigation**: `POST /navigate` starts a background session that opens
//!   the requested website through the Spotlight overlay
//! - **Extraction**: `POST /extract-website` resolves the website only
//! - **Endpoints**: `POST /create-endpoint` and `/refresh-endpoint` scrape a
//!   page into JSON served at `GET /{slug}`
//! - **Docs**: `/generate-docs` as JSON (POST) or server-sent events (GET)
//!
//! At most one desktop session runs at a time; a second request while the
//! session gate is held gets `429`.

pub mod error;
pub mod http;
pub mod server;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
