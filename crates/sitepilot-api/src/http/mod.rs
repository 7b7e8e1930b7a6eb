//! HTTP interface module.
//!
//! - Navigation and website extraction
//! - Scraped endpoint creation, refresh and serving
//! - Documentation generation (JSON and SSE)
//! - Service info and health

pub mod docs;
pub mod endpoints;
pub mod handlers;
pub mod routes;

pub(crate) mod monitoring;
