//! Anthropic Messages API provider for SitePilot.
//!
//! Speaks the plain Messages API and the computer-use beta. The computer
//! tool is sent whenever a request carries [`ToolSpec::Computer`].
//!
//! [`ToolSpec::Computer`]: sitepilot_protocols::ToolSpec::Computer

mod api;
mod converter;
mod parser;
mod provider;

pub use provider::AnthropicProvider;
