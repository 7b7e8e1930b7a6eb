//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod schema_automation;
mod schema_endpoints;

pub use schema_automation::*;
pub use schema_endpoints::*;

/// Convert a seconds value into a `Duration`.
/// Negative or non-finite values collapse to zero; values too large for a
/// `Duration` saturate at `Duration::MAX`.
pub fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub shortcuts: Vec<ShortcutConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Falls back to `ANTHROPIC_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_computer_use_beta")]
    pub computer_use_beta: String,

    /// Model driving computer-use sessions.
    #[serde(default = "default_agent_model")]
    pub agent_model: String,

    /// Model used for website extraction and HTML to JSON conversion.
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Model used to write endpoint documentation.
    #[serde(default = "default_docs_model")]
    pub docs_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            computer_use_beta: default_computer_use_beta(),
            agent_model: default_agent_model(),
            extraction_model: default_extraction_model(),
            docs_model: default_docs_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_computer_use_beta() -> String {
    "computer-use-2025-01-24".to_string()
}

fn default_agent_model() -> String {
    "claude-opus-4-20250514".to_string()
}

fn default_extraction_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_docs_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout() -> u64 {
    120
}

/// Display geometry reported to the computer-use tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_width")]
    pub width: u32,

    #[serde(default = "default_display_height")]
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
        }
    }
}

fn default_display_width() -> u32 {
    3024
}

fn default_display_height() -> u32 {
    1964
}

/// Session pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pause before the first injected input so the user can read the warning.
    #[serde(default = "default_user_warning_delay")]
    pub user_warning_delay_secs: f64,

    /// Grace period after which the session gate is released.
    #[serde(default = "default_lock_release_delay")]
    pub lock_release_delay_secs: f64,

    /// Pause between model round trips.
    #[serde(default = "default_between_iterations")]
    pub between_iterations_secs: f64,

    /// Settle time after the direct shortcut flow presses return.
    #[serde(default = "default_page_load_wait")]
    pub page_load_wait_secs: f64,

    #[serde(default = "default_navigate_max_iterations")]
    pub navigate_max_iterations: u32,

    #[serde(default = "default_scrape_max_iterations")]
    pub scrape_max_iterations: u32,
}

impl SessionConfig {
    pub fn user_warning_delay(&self) -> Duration {
        secs(self.user_warning_delay_secs)
    }

    pub fn lock_release_delay(&self) -> Duration {
        secs(self.lock_release_delay_secs)
    }

    pub fn between_iterations(&self) -> Duration {
        secs(self.between_iterations_secs)
    }

    pub fn page_load_wait(&self) -> Duration {
        secs(self.page_load_wait_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_warning_delay_secs: default_user_warning_delay(),
            lock_release_delay_secs: default_lock_release_delay(),
            between_iterations_secs: default_between_iterations(),
            page_load_wait_secs: default_page_load_wait(),
            navigate_max_iterations: default_navigate_max_iterations(),
            scrape_max_iterations: default_scrape_max_iterations(),
        }
    }
}

fn default_user_warning_delay() -> f64 {
    0.3
}

fn default_lock_release_delay() -> f64 {
    0.1
}

fn default_between_iterations() -> f64 {
    0.02
}

fn default_page_load_wait() -> f64 {
    4.0
}

fn default_navigate_max_iterations() -> u32 {
    12
}

fn default_scrape_max_iterations() -> u32 {
    15
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
