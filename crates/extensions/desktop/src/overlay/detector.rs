//! Overlay visibility detection.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use screenshots::image::{imageops, RgbaImage};
use serde::Serialize;
use sitepilot_config::{DetectionRegion, DetectorConfig};
use tracing::debug;

use crate::backend::{OverlayQuery, ScreenCapturer};
use crate::screenshot::CaptureError;

/// How a detection verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    NativeQuery,
    PixelHeuristic,
    /// Both methods failed; the verdict is "not visible".
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    pub visible: bool,
    pub method: DetectionMethod,
}

/// Decides whether the overlay is currently visible. Never fails.
pub trait OverlayDetector: Send + Sync {
    fn is_overlay_open(&self) -> DetectionResult;
}

/// Native query first, screen-region darkness second, both inside one
/// detection deadline.
pub struct SpotlightDetector {
    query: Arc<dyn OverlayQuery>,
    screen: Arc<dyn ScreenCapturer>,
    region: DetectionRegion,
    darkness_threshold: u8,
    dark_ratio: f64,
    deadline: Duration,
    query_timeout: Duration,
}

impl SpotlightDetector {
    pub fn new(
        query: Arc<dyn OverlayQuery>,
        screen: Arc<dyn ScreenCapturer>,
        config: &DetectorConfig,
    ) -> Self {
        Self {
            query,
            screen,
            region: config.region,
            darkness_threshold: config.darkness_threshold,
            dark_ratio: config.dark_ratio,
            deadline: config.deadline(),
            query_timeout: config.query_timeout(),
        }
    }

    fn detect_from_pixels(&self, budget: Duration) -> Result<bool, String> {
        let screen = self.screen.clone();
        let region = self.region;
        let threshold = self.darkness_threshold;
        let fraction = within(budget, move || -> Result<f64, CaptureError> {
            let image = screen.capture()?;
            Ok(dark_fraction(&image, &region, threshold))
        })
        .ok_or_else(|| format!("screen sampling exceeded {:?}", budget))?
        .map_err(|e| e.to_string())?;

        debug!(fraction, threshold = self.dark_ratio, "Overlay region darkness");
        Ok(fraction > self.dark_ratio)
    }
}

impl OverlayDetector for SpotlightDetector {
    fn is_overlay_open(&self) -> DetectionResult {
        let started = Instant::now();

        let query = self.query.clone();
        match within(self.query_timeout, move || query.is_visible()) {
            Some(Ok(visible)) => {
                return DetectionResult {
                    visible,
                    method: DetectionMethod::NativeQuery,
                };
            }
            Some(Err(e)) => debug!("Native overlay query unavailable, sampling pixels: {}", e),
            None => debug!(
                "Native overlay query gave no answer within {:?}, sampling pixels",
                self.query_timeout
            ),
        }

        let remaining = self.deadline.saturating_sub(started.elapsed());
        match self.detect_from_pixels(remaining) {
            Ok(visible) => DetectionResult {
                visible,
                method: DetectionMethod::PixelHeuristic,
            },
            Err(e) => {
                debug!("Pixel overlay detection failed: {}", e);
                DetectionResult {
                    visible: false,
                    method: DetectionMethod::Unavailable,
                }
            }
        }
    }
}

/// Run `work` on a helper thread and wait at most `budget` for its answer.
/// An overrunning worker is left to finish on its own; its answer is dropped.
fn within<T, F>(budget: Duration, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    if budget.is_zero() {
        return None;
    }

    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("overlay-detect".to_string())
        .spawn(move || {
            let _ = tx.send(work());
        })
        .ok()?;
    rx.recv_timeout(budget).ok()
}

/// Fraction of pixels in `region` whose greyscale value is below
/// `threshold`.
pub fn dark_fraction(image: &RgbaImage, region: &DetectionRegion, threshold: u8) -> f64 {
    if image.width() == 0 || image.height() == 0 {
        return 0.0;
    }

    let (x, y, w, h) = region.bounds(image.width(), image.height());
    let cropped = imageops::crop_imm(image, x, y, w, h).to_image();
    let grey = imageops::grayscale(&cropped);

    let total = grey.width() as usize * grey.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let dark = grey.pixels().filter(|p| p.0[0] < threshold).count();
    dark as f64 / total as f64
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
