//! Smoothed machine speed estimate.

use std::time::Duration;

use parking_lot::Mutex;
use sitepilot_config::OverlayConfig;
use tracing::debug;

const SPEED_UP: f64 = 1.1;
const SLOW_DOWN: f64 = 0.9;

#[derive(Debug)]
struct SpeedState {
    speed: f64,
    last_elapsed: Option<Duration>,
}

/// Multiplier describing how quickly this machine opens the overlay.
///
/// Only updated from successful primary opens. [`SpeedEstimate::scaled_wait`]
/// is offered to callers budgeting their own waits; the opener's poll
/// interval and max wait are not scaled by it.
#[derive(Debug)]
pub struct SpeedEstimate {
    state: Mutex<SpeedState>,
    min: f64,
    max: f64,
    fast_threshold: Duration,
}

impl SpeedEstimate {
    pub fn new(min: f64, max: f64, fast_threshold: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            state: Mutex::new(SpeedState {
                speed: 1.0_f64.clamp(min, max),
                last_elapsed: None,
            }),
            min,
            max,
            fast_threshold,
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.speed_min, config.speed_max, config.fast_threshold())
    }

    pub fn speed(&self) -> f64 {
        self.state.lock().speed
    }

    /// Latency of the last observed open.
    pub fn last_elapsed(&self) -> Option<Duration> {
        self.state.lock().last_elapsed
    }

    /// Fold one observed open latency into the estimate and return the new
    /// speed.
    pub fn observe(&self, elapsed: Duration) -> f64 {
        let mut state = self.state.lock();
        state.last_elapsed = Some(elapsed);

        if elapsed < self.fast_threshold {
            state.speed = (state.speed * SPEED_UP).min(self.max);
            debug!(speed = state.speed, ?elapsed, "System speed increased");
        } else if elapsed > self.fast_threshold * 2 {
            state.speed = (state.speed * SLOW_DOWN).max(self.min);
            debug!(speed = state.speed, ?elapsed, "System speed decreased");
        }

        state.speed
    }

    /// `base / speed`.
    pub fn scaled_wait(&self, base: Duration) -> Duration {
        base.div_f64(self.speed())
    }
}

impl Default for SpeedEstimate {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(500);

    fn estimate() -> SpeedEstimate {
        SpeedEstimate::new(0.5, 2.0, FAST)
    }

    #[test]
    fn test_initial_speed() {
        assert_eq!(estimate().speed(), 1.0);
        assert_eq!(estimate().last_elapsed(), None);
        assert_eq!(SpeedEstimate::new(1.5, 2.0, FAST).speed(), 1.5);
    }

    #[test]
    fn test_fast_open_increases_speed() {
        let speed = estimate();
        let before = speed.speed();
        let after = speed.observe(Duration::from_millis(200));
        assert!(after > before);
        assert!((after - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_slow_open_decreases_speed() {
        let speed = estimate();
        let after = speed.observe(Duration::from_millis(1200));
        assert!((after - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_middle_band_unchanged() {
        let speed = estimate();
        for ms in [500, 750, 1000] {
            assert_eq!(speed.observe(Duration::from_millis(ms)), 1.0);
        }
        assert_eq!(speed.last_elapsed(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_fast_opens_converge_to_max() {
        let speed = estimate();
        let mut previous = speed.speed();
        for _ in 0..50 {
            let current = speed.observe(Duration::from_millis(100));
            assert!(current <= 2.0);
            assert!(current > previous || current == 2.0);
            previous = current;
        }
        assert_eq!(speed.speed(), 2.0);
    }

    #[test]
    fn test_slow_opens_converge_to_min() {
        let speed = estimate();
        let mut previous = speed.speed();
        for _ in 0..50 {
            let current = speed.observe(Duration::from_secs(3));
            assert!(current >= 0.5);
            assert!(current < previous || current == 0.5);
            previous = current;
        }
        assert_eq!(speed.speed(), 0.5);
    }

    #[test]
    fn test_scaled_wait() {
        let speed = estimate();
        assert_eq!(speed.scaled_wait(Duration::from_secs(1)), Duration::from_secs(1));
        for _ in 0..50 {
            speed.observe(Duration::from_millis(100));
        }
        assert_eq!(
            speed.scaled_wait(Duration::from_secs(1)),
            Duration::from_millis(500)
        );
    }
}
