//! Configuration errors.

use thiserror::Error;

use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<&ValidationError> for ConfigError {
    fn from(error: &ValidationError) -> Self {
        ConfigError::InvalidValue {
            field: error.path.clone(),
            message: error.message.clone(),
        }
    }
}
