//! Desktop automation schema: overlay opener timing, detector tuning, input pacing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::secs;

/// Timing for opening the search overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Sleep after the chord before the first detection.
    #[serde(default = "default_initial_wait")]
    pub initial_wait_secs: f64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,

    /// Polling budget, counted from the chord (includes the initial wait).
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: f64,

    /// Sleep after the fallback hotkey before the single re-check.
    #[serde(default = "default_fallback_wait")]
    pub fallback_wait_secs: f64,

    /// Pause between the low-level press/release events of the chord.
    #[serde(default = "default_chord_delay")]
    pub chord_delay_secs: f64,

    /// Opens faster than this speed the machine estimate up; slower than
    /// twice this slow it down.
    #[serde(default = "default_fast_threshold")]
    pub fast_threshold_secs: f64,

    #[serde(default = "default_speed_min")]
    pub speed_min: f64,

    #[serde(default = "default_speed_max")]
    pub speed_max: f64,

    /// Key chord that opens the overlay, modifier first.
    #[serde(default = "default_chord")]
    pub chord: Vec<String>,
}

impl OverlayConfig {
    pub fn initial_wait(&self) -> Duration {
        secs(self.initial_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        secs(self.max_wait_secs)
    }

    pub fn fallback_wait(&self) -> Duration {
        secs(self.fallback_wait_secs)
    }

    pub fn chord_delay(&self) -> Duration {
        secs(self.chord_delay_secs)
    }

    pub fn fast_threshold(&self) -> Duration {
        secs(self.fast_threshold_secs)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            initial_wait_secs: default_initial_wait(),
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
            fallback_wait_secs: default_fallback_wait(),
            chord_delay_secs: default_chord_delay(),
            fast_threshold_secs: default_fast_threshold(),
            speed_min: default_speed_min(),
            speed_max: default_speed_max(),
            chord: default_chord(),
        }
    }
}

fn default_initial_wait() -> f64 {
    0.2
}

fn default_poll_interval() -> f64 {
    0.1
}

fn default_max_wait() -> f64 {
    2.0
}

fn default_fallback_wait() -> f64 {
    0.8
}

fn default_chord_delay() -> f64 {
    0.02
}

fn default_fast_threshold() -> f64 {
    0.5
}

fn default_speed_min() -> f64 {
    0.5
}

fn default_speed_max() -> f64 {
    2.0
}

fn default_chord() -> Vec<String> {
    vec!["command".to_string(), "space".to_string()]
}

/// Overlay detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Upper bound for one whole detection, native query and pixel
    /// fallback together.
    #[serde(default = "default_deadline")]
    pub deadline_secs: f64,

    /// Share of the deadline the native query may use; the rest is left for
    /// the pixel fallback. Zero disables the native query.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: f64,

    #[serde(default = "default_overlay_name")]
    pub process_name: String,

    #[serde(default = "default_overlay_name")]
    pub window_name: String,

    #[serde(default)]
    pub region: DetectionRegion,

    /// Greyscale values strictly below this count as dark.
    #[serde(default = "default_darkness_threshold")]
    pub darkness_threshold: u8,

    /// The overlay is considered open when the dark fraction exceeds this.
    #[serde(default = "default_dark_ratio")]
    pub dark_ratio: f64,
}

impl DetectorConfig {
    pub fn deadline(&self) -> Duration {
        secs(self.deadline_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        secs(self.query_timeout_secs).min(self.deadline())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline(),
            query_timeout_secs: default_query_timeout(),
            process_name: default_overlay_name(),
            window_name: default_overlay_name(),
            region: DetectionRegion::default(),
            darkness_threshold: default_darkness_threshold(),
            dark_ratio: default_dark_ratio(),
        }
    }
}

fn default_deadline() -> f64 {
    0.5
}

fn default_query_timeout() -> f64 {
    0.3
}

fn default_overlay_name() -> String {
    "Spotlight".to_string()
}

fn default_darkness_threshold() -> u8 {
    100
}

fn default_dark_ratio() -> f64 {
    0.3
}

/// Sampled screen region, as fractions of the screen size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionRegion {
    /// Horizontal centre of the region.
    pub center_x: f64,
    /// Top edge, measured from the top of the screen.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionRegion {
    /// Pixel rectangle `(x, y, width, height)` for a screen of the given
    /// size, clamped to the screen and at least one pixel in each direction.
    pub fn bounds(&self, screen_width: u32, screen_height: u32) -> (u32, u32, u32, u32) {
        let sw = screen_width.max(1) as f64;
        let sh = screen_height.max(1) as f64;

        let w = (self.width * sw).round().clamp(1.0, sw);
        let h = (self.height * sh).round().clamp(1.0, sh);
        let x = (self.center_x * sw - w / 2.0).round().clamp(0.0, sw - w);
        let y = (self.top * sh).round().clamp(0.0, sh - h);

        (x as u32, y as u32, w as u32, h as u32)
    }
}

impl Default for DetectionRegion {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            top: 0.225,
            width: 0.13,
            height: 0.075,
        }
    }
}

/// Input injection pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Pause after every injected event.
    #[serde(default = "default_action_pause")]
    pub action_pause_secs: f64,

    /// Duration of the pointer travel during a drag.
    #[serde(default = "default_drag_duration")]
    pub drag_duration_secs: f64,

    /// Wheel ticks injected per requested scroll unit.
    #[serde(default = "default_scroll_ticks")]
    pub scroll_ticks_per_unit: i32,

    /// Settle time after select-all and after copy when capturing content.
    #[serde(default = "default_capture_settle")]
    pub capture_settle_secs: f64,

    /// Ceiling for model-requested `wait` and `hold_key` durations.
    #[serde(default = "default_max_action_wait")]
    pub max_action_wait_secs: f64,

    #[serde(default = "default_true")]
    pub failsafe_enabled: bool,

    /// Pointer positions within this many pixels of the top-left corner
    /// trip the fail-safe.
    #[serde(default)]
    pub failsafe_margin_px: i32,
}

impl InputConfig {
    pub fn action_pause(&self) -> Duration {
        secs(self.action_pause_secs)
    }

    pub fn drag_duration(&self) -> Duration {
        secs(self.drag_duration_secs)
    }

    pub fn capture_settle(&self) -> Duration {
        secs(self.capture_settle_secs)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            action_pause_secs: default_action_pause(),
            drag_duration_secs: default_drag_duration(),
            scroll_ticks_per_unit: default_scroll_ticks(),
            capture_settle_secs: default_capture_settle(),
            max_action_wait_secs: default_max_action_wait(),
            failsafe_enabled: true,
            failsafe_margin_px: 0,
        }
    }
}

fn default_action_pause() -> f64 {
    0.01
}

fn default_drag_duration() -> f64 {
    0.2
}

fn default_scroll_ticks() -> i32 {
    100
}

fn default_capture_settle() -> f64 {
    0.15
}

fn default_max_action_wait() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}
