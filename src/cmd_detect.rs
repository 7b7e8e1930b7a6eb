//! `detect` command: one detection, one timed open.

use std::sync::Arc;

use sitepilot_config::Config;
use sitepilot_desktop::{
    AdaptiveOpener, AppleScriptQuery, DesktopBackend, DetectionResult, FailSafe, InputDriver,
    OpenAttempt, OverlayDetector, OverlayOpen, OverlayOpener, SpeedEstimate, SpotlightDetector,
    SystemBackend,
};

use crate::server::BoxError;

fn detect_and_open(config: &Config) -> Result<(DetectionResult, OverlayOpen, f64), BoxError> {
    let backend = SystemBackend::new();
    let query = Arc::new(AppleScriptQuery::from_config(&config.detector));
    let detector = Arc::new(SpotlightDetector::new(query, backend.screen(), &config.detector));
    let detection = detector.is_overlay_open();

    let speed = Arc::new(SpeedEstimate::from_config(&config.overlay));
    let opener = AdaptiveOpener::new(detector, Arc::clone(&speed), config.overlay.clone());
    let failsafe = FailSafe::from_config(&config.input);
    failsafe.check(None)?;
    let mut input = failsafe.guard(backend.input()?, config.input.action_pause());
    let open = opener.open_overlay(&mut input);
    if opened_here(&open) {
        input.key_press("escape")?;
    }

    Ok((detection, open, speed.speed()))
}

/// Only an overlay this command opened itself is dismissed again; one the
/// user already had open is left alone.
fn opened_here(open: &OverlayOpen) -> bool {
    open.opened && open.attempt != OpenAttempt::AlreadyOpen
}

pub(crate) async fn detect(config: Config) -> Result<(), BoxError> {
    let (detection, open, speed) =
        tokio::task::spawn_blocking(move || detect_and_open(&config)).await??;

    println!("Overlay visible:  {} (via {:?})", detection.visible, detection.method);
    println!(
        "Open attempt:     {} via {:?} in {} ms",
        if open.opened { "opened" } else { "timed out" },
        open.attempt,
        open.elapsed.as_millis()
    );
    println!("Speed multiplier: {:.2}", speed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn open(opened: bool, attempt: OpenAttempt) -> OverlayOpen {
        OverlayOpen {
            opened,
            elapsed: Duration::from_millis(120),
            attempt,
        }
    }

    #[test]
    fn test_user_overlay_is_left_open() {
        assert!(!opened_here(&open(true, OpenAttempt::AlreadyOpen)));
    }

    #[test]
    fn test_overlay_opened_here_is_dismissed() {
        assert!(opened_here(&open(true, OpenAttempt::Primary)));
        assert!(opened_here(&open(true, OpenAttempt::Fallback)));
    }

    #[test]
    fn test_failed_open_sends_nothing() {
        assert!(!opened_here(&open(false, OpenAttempt::Primary)));
        assert!(!opened_here(&open(false, OpenAttempt::Fallback)));
    }
}
