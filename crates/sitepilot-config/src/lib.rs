//! # SitePilot Config
//!
//! TOML configuration for the SitePilot agent. Every timing constant used by
//! the overlay detector, the adaptive opener and the action executor lives
//! here so it can be tuned per machine without a rebuild.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{API_KEY_ENV, ConfigLoader};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
