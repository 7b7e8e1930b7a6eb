//! Endpoint cache and navigation shortcut schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Scraped endpoint storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Directory holding `<slug>.json` documents.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Slugs that are registered at startup even if no document exists yet.
    #[serde(default = "default_always_registered")]
    pub always_registered: Vec<String>,

    /// Captured page text is truncated to this many characters before it is
    /// sent for conversion.
    #[serde(default = "default_html_char_limit")]
    pub html_char_limit: usize,

    /// Domain used when a request names no recognisable website.
    #[serde(default)]
    pub fallback_domain: Option<String>,

    /// Fields every scraped item is asked to carry.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            always_registered: default_always_registered(),
            html_char_limit: default_html_char_limit(),
            fallback_domain: None,
            fields: default_fields(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_always_registered() -> Vec<String> {
    vec!["whatsnew".to_string()]
}

fn default_html_char_limit() -> usize {
    100_000
}

fn default_fields() -> Vec<String> {
    ["product_name", "price", "product_url", "image_url"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// A direct navigation flow that bypasses the model loop when a request
/// mentions one of its keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    pub name: String,

    /// Case-insensitive substrings matched against the request.
    #[serde(default)]
    pub keywords: Vec<String>,

    pub target_url: String,
}

impl ShortcutConfig {
    /// Whether `request` mentions any of this shortcut's keywords.
    pub fn matches(&self, request: &str) -> bool {
        let request = request.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .any(|k| request.contains(&k.to_lowercase()))
    }
}
