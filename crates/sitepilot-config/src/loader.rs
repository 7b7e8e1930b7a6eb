//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Environment variable holding the model API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DISPLAY_WIDTH_ENV: &str = "DISPLAY_WIDTH";
const DISPLAY_HEIGHT_ENV: &str = "DISPLAY_HEIGHT";

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults. Process
    /// environment overrides are applied in both cases.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(e) => return Err(e),
        };
        Self::apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply `ANTHROPIC_API_KEY`, `DISPLAY_WIDTH` and `DISPLAY_HEIGHT`
    /// overrides using the given variable lookup.
    pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if config.provider.api_key.as_deref().is_none_or(str::is_empty) {
            if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
                config.provider.api_key = Some(key);
            }
        }

        if let Some(width) = lookup(DISPLAY_WIDTH_ENV) {
            config.display.width = parse_dimension(DISPLAY_WIDTH_ENV, &width)?;
        }
        if let Some(height) = lookup(DISPLAY_HEIGHT_ENV) {
            config.display.height = parse_dimension(DISPLAY_HEIGHT_ENV, &height)?;
        }

        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.sitepilot`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

fn parse_dimension(field: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
