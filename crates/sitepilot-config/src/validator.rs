//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, DetectionRegion};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_provider(config, &mut result);
        Self::validate_display(config, &mut result);
        Self::validate_overlay(config, &mut result);
        Self::validate_detector(config, &mut result);
        Self::validate_input(config, &mut result);
        Self::validate_shortcuts(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new(
                "server.host",
                "Host cannot be empty",
            ));
        }
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;

        if provider.api_key.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "provider.api_key",
                "API key is not set, model calls will fail until ANTHROPIC_API_KEY is provided",
            ));
        }

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            result.add_error(ValidationError::new(
                "provider.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if provider.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "provider.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_display(config: &Config, result: &mut ValidationResult) {
        if config.display.width == 0 || config.display.height == 0 {
            result.add_error(ValidationError::new(
                "display",
                "Display width and height must be greater than 0",
            ));
        }
    }

    fn validate_overlay(config: &Config, result: &mut ValidationResult) {
        let overlay = &config.overlay;

        for (field, value) in [
            ("overlay.poll_interval_secs", overlay.poll_interval_secs),
            ("overlay.max_wait_secs", overlay.max_wait_secs),
            ("overlay.fast_threshold_secs", overlay.fast_threshold_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                result.add_error(ValidationError::new(field, "must be a positive number"));
            }
        }

        for (field, value) in [
            ("overlay.initial_wait_secs", overlay.initial_wait_secs),
            ("overlay.fallback_wait_secs", overlay.fallback_wait_secs),
            ("overlay.chord_delay_secs", overlay.chord_delay_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                result.add_error(ValidationError::new(field, "must not be negative"));
            }
        }

        if !(overlay.speed_min > 0.0 && overlay.speed_min <= overlay.speed_max) {
            result.add_error(ValidationError::new(
                "overlay.speed_min",
                "speed_min must be positive and not greater than speed_max",
            ));
        }

        if overlay.chord.is_empty() {
            result.add_error(ValidationError::new(
                "overlay.chord",
                "Chord must name at least one key",
            ));
        }

        if overlay.initial_wait_secs > overlay.max_wait_secs {
            result.add_warning(ValidationWarning::new(
                "overlay.initial_wait_secs",
                "initial wait exceeds max wait, the overlay is checked only once",
            ));
        }
    }

    fn validate_detector(config: &Config, result: &mut ValidationResult) {
        let detector = &config.detector;

        if !(detector.dark_ratio > 0.0 && detector.dark_ratio < 1.0) {
            result.add_error(ValidationError::new(
                "detector.dark_ratio",
                "dark_ratio must be between 0 and 1",
            ));
        }

        if !region_in_unit_square(&detector.region) {
            result.add_error(ValidationError::new(
                "detector.region",
                "Region must lie within the screen (fractions between 0 and 1)",
            ));
        }

        if !(detector.deadline_secs.is_finite() && detector.deadline_secs > 0.0) {
            result.add_error(ValidationError::new(
                "detector.deadline_secs",
                "must be a positive number",
            ));
        }

        if detector.query_timeout_secs <= 0.0 {
            result.add_warning(ValidationWarning::new(
                "detector.query_timeout_secs",
                "Native query disabled, detection will use the pixel heuristic only",
            ));
        } else if !(detector.query_timeout_secs < detector.deadline_secs) {
            result.add_error(ValidationError::new(
                "detector.query_timeout_secs",
                "query_timeout_secs must be shorter than deadline_secs to leave time for the pixel fallback",
            ));
        }
    }

    fn validate_input(config: &Config, result: &mut ValidationResult) {
        if config.input.scroll_ticks_per_unit <= 0 {
            result.add_error(ValidationError::new(
                "input.scroll_ticks_per_unit",
                "scroll_ticks_per_unit must be greater than 0",
            ));
        }

        let max_wait = config.input.max_action_wait_secs;
        if !(max_wait.is_finite() && max_wait >= 0.0) {
            result.add_error(ValidationError::new(
                "input.max_action_wait_secs",
                "must not be negative",
            ));
        }

        if !config.input.failsafe_enabled {
            result.add_warning(ValidationWarning::new(
                "input.failsafe_enabled",
                "Fail-safe is disabled, a runaway session can only be stopped by killing the process",
            ));
        }
    }

    fn validate_shortcuts(config: &Config, result: &mut ValidationResult) {
        for (i, shortcut) in config.shortcuts.iter().enumerate() {
            if shortcut.keywords.iter().all(|k| k.trim().is_empty()) {
                result.add_warning(ValidationWarning::new(
                    format!("shortcuts[{}].keywords", i),
                    format!("Shortcut '{}' has no keywords and will never match", shortcut.name),
                ));
            }

            if !shortcut.target_url.starts_with("http://")
                && !shortcut.target_url.starts_with("https://")
            {
                result.add_error(ValidationError::new(
                    format!("shortcuts[{}].target_url", i),
                    "target_url must start with http:// or https://",
                ));
            }
        }
    }
}

fn region_in_unit_square(region: &DetectionRegion) -> bool {
    let half = region.width / 2.0;
    region.width > 0.0
        && region.height > 0.0
        && region.center_x - half >= 0.0
        && region.center_x + half <= 1.0
        && region.top >= 0.0
        && region.top + region.height <= 1.0
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
