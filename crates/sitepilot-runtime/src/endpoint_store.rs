//! On-disk cache of scraped endpoint documents.
//!
//! Each endpoint is a pretty-printed JSON file `<cache_dir>/<slug>.json`.
//! A slug is servable once registered; registration comes from files found
//! at startup, the configured always-registered list, and successful
//! scrapes.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;
use sitepilot_config::EndpointsConfig;
use thiserror::Error;
use tracing::{debug, info};

/// Why a slug could not be served.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Endpoint '/{0}' is not registered")]
    NotRegistered(String),

    #[error("Data file not found. Try refreshing the endpoint.")]
    Missing(String),

    #[error("Failed to read JSON: {0}")]
    Corrupt(String),
}

/// Normalise user input into a slug: trimmed, lowercase, no leading `/`,
/// no `.json` suffix, only `[a-z0-9_-]`. Returns `None` when nothing is left.
pub fn sanitize_slug(raw: &str) -> Option<String> {
    let slug = raw.trim().to_lowercase();
    let slug = slug.strip_prefix('/').unwrap_or(&slug);
    let slug = slug.strip_suffix(".json").unwrap_or(slug);
    let slug: String = slug
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    (!slug.is_empty()).then_some(slug)
}

pub struct EndpointStore {
    dir: PathBuf,
    registered: RwLock<BTreeSet<String>>,
}

impl EndpointStore {
    /// Open the store, registering every `*.json` already in `dir` plus
    /// `always`. A missing directory is not an error.
    pub fn open(dir: impl Into<PathBuf>, always: &[String]) -> io::Result<Self> {
        let dir = dir.into();
        let mut registered: BTreeSet<String> =
            always.iter().filter_map(|s| sanitize_slug(s)).collect();

        match fs::read_dir(&dir) {
            Ok(entries) => {
                for entry in entries {
                    let path = entry?.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        let slug = path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .and_then(sanitize_slug);
                        if let Some(slug) = slug {
                            registered.insert(slug);
                        }
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Endpoint cache {} does not exist yet", dir.display());
            }
            Err(e) => return Err(e),
        }

        info!("Endpoint store at {} with {} registered slugs", dir.display(), registered.len());
        Ok(Self {
            dir,
            registered: RwLock::new(registered),
        })
    }

    pub fn from_config(config: &EndpointsConfig) -> io::Result<Self> {
        Self::open(&config.cache_dir, &config.always_registered)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug))
    }

    pub fn register(&self, slug: &str) -> bool {
        self.registered.write().insert(slug.to_string())
    }

    pub fn is_registered(&self, slug: &str) -> bool {
        self.registered.read().contains(slug)
    }

    /// Registered slugs in sorted order.
    pub fn slugs(&self) -> Vec<String> {
        self.registered.read().iter().cloned().collect()
    }

    /// Write `data` for `slug` and register it.
    pub fn save(&self, slug: &str, data: &Value) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(slug);
        let body = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
        fs::write(&path, body)?;
        self.register(slug);
        info!("Saved endpoint '/{}' to {}", slug, path.display());
        Ok(path)
    }

    /// Read the cached document for `slug`.
    pub fn load(&self, slug: &str) -> Result<Value, StoreError> {
        if !self.is_registered(slug) {
            return Err(StoreError::NotRegistered(slug.to_string()));
        }
        let path = self.path_for(slug);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(slug.to_string()));
            }
            Err(e) => return Err(StoreError::Corrupt(e.to_string())),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}
