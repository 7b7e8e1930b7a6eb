//! Adaptive overlay opener.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use sitepilot_config::OverlayConfig;
use tracing::{debug, info, warn};

use super::detector::OverlayDetector;
use super::speed::SpeedEstimate;
use crate::backend::InputDriver;
use crate::input::InputError;

const CLEAR_SETTLE: Duration = Duration::from_millis(50);

/// Which step of the open sequence produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAttempt {
    /// The overlay was already visible; nothing was sent.
    AlreadyOpen,
    /// Low-level chord followed by polling.
    Primary,
    /// Combined hotkey followed by one fixed wait and a single check.
    Fallback,
}

/// Outcome of an open request. A timeout is `opened == false`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayOpen {
    pub opened: bool,
    pub elapsed: Duration,
    pub attempt: OpenAttempt,
}

/// Opens the search overlay.
pub trait OverlayOpener: Send + Sync {
    fn open_overlay(&self, input: &mut dyn InputDriver) -> OverlayOpen;

    /// Select and delete any query left in an open overlay. Returns whether
    /// the overlay was open.
    fn clear_overlay_if_open(&self, input: &mut dyn InputDriver) -> bool;

    /// Key chord that opens the overlay.
    fn chord(&self) -> &[String];
}

/// Chord, poll until visible, fall back once.
pub struct AdaptiveOpener {
    detector: Arc<dyn OverlayDetector>,
    speed: Arc<SpeedEstimate>,
    config: OverlayConfig,
}

impl AdaptiveOpener {
    const ATTEMPTS: [OpenAttempt; 2] = [OpenAttempt::Primary, OpenAttempt::Fallback];

    pub fn new(
        detector: Arc<dyn OverlayDetector>,
        speed: Arc<SpeedEstimate>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            detector,
            speed,
            config,
        }
    }

    pub fn speed(&self) -> &Arc<SpeedEstimate> {
        &self.speed
    }

    pub fn detector(&self) -> &Arc<dyn OverlayDetector> {
        &self.detector
    }

    fn run_attempt(
        &self,
        attempt: OpenAttempt,
        input: &mut dyn InputDriver,
    ) -> Result<bool, InputError> {
        match attempt {
            OpenAttempt::Primary => {
                self.press_chord(input)?;
                Ok(self.poll_until_open())
            }
            OpenAttempt::Fallback => {
                let keys: Vec<&str> = self.config.chord.iter().map(String::as_str).collect();
                input.hotkey(&keys)?;
                thread::sleep(self.config.fallback_wait());
                Ok(self.detector.is_overlay_open().visible)
            }
            OpenAttempt::AlreadyOpen => Ok(true),
        }
    }

    /// Hold the modifiers, click the last key, release in reverse, with a
    /// short pause around the click so the OS registers the chord.
    fn press_chord(&self, input: &mut dyn InputDriver) -> Result<(), InputError> {
        let (last, modifiers) = self
            .config
            .chord
            .split_last()
            .ok_or_else(|| InputError::InvalidKey("empty overlay chord".to_string()))?;

        for key in modifiers {
            input.key_down(key)?;
        }
        thread::sleep(self.config.chord_delay());
        let pressed = input.key_press(last);
        thread::sleep(self.config.chord_delay());

        let mut released = Ok(());
        for key in modifiers.iter().rev() {
            if let Err(e) = input.key_up(key) {
                released = Err(e);
            }
        }

        pressed.and(released)
    }

    fn poll_until_open(&self) -> bool {
        let initial = self.config.initial_wait();
        let interval = self.config.poll_interval();
        let max_wait = self.config.max_wait();

        thread::sleep(initial);
        let mut waited = initial;
        while waited < max_wait {
            if self.detector.is_overlay_open().visible {
                return true;
            }
            thread::sleep(interval);
            waited += interval;
            if interval.is_zero() {
                break;
            }
        }
        false
    }
}

impl OverlayOpener for AdaptiveOpener {
    fn open_overlay(&self, input: &mut dyn InputDriver) -> OverlayOpen {
        let start = Instant::now();

        if self.detector.is_overlay_open().visible {
            debug!("Overlay already open");
            return OverlayOpen {
                opened: true,
                elapsed: Duration::ZERO,
                attempt: OpenAttempt::AlreadyOpen,
            };
        }

        for attempt in Self::ATTEMPTS {
            match self.run_attempt(attempt, input) {
                Ok(true) => {
                    let elapsed = start.elapsed();
                    if attempt == OpenAttempt::Primary {
                        self.speed.observe(elapsed);
                    }
                    info!(?attempt, ?elapsed, "Overlay opened");
                    return OverlayOpen {
                        opened: true,
                        elapsed,
                        attempt,
                    };
                }
                Ok(false) => warn!(?attempt, "Overlay not detected before deadline"),
                Err(e) => warn!(?attempt, "Overlay chord failed: {}", e),
            }
        }

        OverlayOpen {
            opened: false,
            elapsed: start.elapsed(),
            attempt: OpenAttempt::Fallback,
        }
    }

    fn clear_overlay_if_open(&self, input: &mut dyn InputDriver) -> bool {
        if !self.detector.is_overlay_open().visible {
            return false;
        }

        debug!("Clearing existing overlay query");
        let cleared = input.hotkey(&["command", "a"]).and_then(|_| {
            thread::sleep(CLEAR_SETTLE);
            input.key_press("delete")
        });
        thread::sleep(CLEAR_SETTLE);
        if let Err(e) = cleared {
            warn!("Failed to clear overlay query: {}", e);
        }
        true
    }

    fn chord(&self) -> &[String] {
        &self.config.chord
    }
}

#[cfg(test)]
#[path = "opener_tests.rs"]
mod tests;
