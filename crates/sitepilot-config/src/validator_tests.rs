use super::*;
use crate::schema::ShortcutConfig;

fn with_key() -> Config {
    let mut config = Config::default();
    config.provider.api_key = Some("sk-ant-test".to_string());
    config
}

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&with_key()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_missing_api_key_is_warning() {
    let result = ConfigValidator::validate(&Config::default()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "provider.api_key"));
}

#[test]
fn test_validate_invalid_port() {
    let mut config = with_key();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_zero_display() {
    let mut config = with_key();
    config.display.height = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "display"));
}

#[test]
fn test_validate_non_positive_interval() {
    let mut config = with_key();
    config.overlay.poll_interval_secs = 0.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "overlay.poll_interval_secs"));
}

#[test]
fn test_validate_inverted_speed_bounds() {
    let mut config = with_key();
    config.overlay.speed_min = 3.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "overlay.speed_min"));
}

#[test]
fn test_validate_empty_chord() {
    let mut config = with_key();
    config.overlay.chord.clear();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "overlay.chord"));
}

#[test]
fn test_validate_dark_ratio_bounds() {
    let mut config = with_key();
    config.detector.dark_ratio = 1.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "detector.dark_ratio"));
}

#[test]
fn test_validate_query_timeout_must_leave_room_for_pixels() {
    let mut config = with_key();
    config.detector.query_timeout_secs = 0.5;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "detector.query_timeout_secs"));
}

#[test]
fn test_zero_query_timeout_only_warns() {
    let mut config = with_key();
    config.detector.query_timeout_secs = 0.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "detector.query_timeout_secs"));
}

#[test]
fn test_validate_detector_deadline() {
    let mut config = with_key();
    config.detector.deadline_secs = 0.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "detector.deadline_secs"));
}

#[test]
fn test_validate_negative_action_wait_ceiling() {
    let mut config = with_key();
    config.input.max_action_wait_secs = -1.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "input.max_action_wait_secs"));
}

#[test]
fn test_validate_region_off_screen() {
    let mut config = with_key();
    config.detector.region.center_x = 0.99;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "detector.region"));
}

#[test]
fn test_validate_shortcut_url() {
    let mut config = with_key();
    config.shortcuts.push(ShortcutConfig {
        name: "bad".to_string(),
        keywords: vec!["bad".to_string()],
        target_url: "ftp://example.com".to_string(),
    });

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
}

#[test]
fn test_validate_shortcut_without_keywords_warns() {
    let mut config = with_key();
    config.shortcuts.push(ShortcutConfig {
        name: "empty".to_string(),
        keywords: vec![],
        target_url: "https://example.com".to_string(),
    });

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(!result.warnings.is_empty());
}
