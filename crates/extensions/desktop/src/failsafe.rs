//! Emergency stop.
//!
//! Moving the pointer into the top-left corner trips a sticky flag shared by
//! every input handle of the session. Once tripped, all further injection
//! fails immediately with [`InputError::FailSafe`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sitepilot_config::InputConfig;
use tracing::warn;

use crate::backend::InputDriver;
use crate::input::{InputError, MouseButton};

/// Per-session fail-safe flag.
#[derive(Debug, Clone)]
pub struct FailSafe {
    tripped: Arc<AtomicBool>,
    enabled: bool,
    margin: i32,
}

impl FailSafe {
    pub fn new(enabled: bool, margin: i32) -> Self {
        Self {
            tripped: Arc::new(AtomicBool::new(false)),
            enabled,
            margin: margin.max(0),
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(config.failsafe_enabled, config.failsafe_margin_px)
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn trip(&self) {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            warn!("Fail-safe tripped, refusing further input for this session");
        }
    }

    /// Refuse input if already tripped, or trip if `position` is inside the
    /// guarded corner.
    pub fn check(&self, position: Option<(i32, i32)>) -> Result<(), InputError> {
        if !self.enabled {
            return Ok(());
        }
        if self.is_tripped() {
            return Err(InputError::FailSafe);
        }
        if let Some((x, y)) = position {
            if x <= self.margin && y <= self.margin {
                self.trip();
                return Err(InputError::FailSafe);
            }
        }
        Ok(())
    }

    /// Wrap a driver so every injection is checked against this flag and
    /// followed by `pause`.
    pub fn guard(&self, inner: Box<dyn InputDriver>, pause: Duration) -> GuardedInput {
        GuardedInput {
            inner,
            failsafe: self.clone(),
            pause,
        }
    }
}

/// Input driver that enforces the fail-safe and paces injected events.
pub struct GuardedInput {
    inner: Box<dyn InputDriver>,
    failsafe: FailSafe,
    pause: Duration,
}

impl GuardedInput {
    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut dyn InputDriver) -> Result<T, InputError>,
    ) -> Result<T, InputError> {
        let position = self.inner.cursor_position().ok();
        self.failsafe.check(position)?;

        let result = op(self.inner.as_mut());
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        result
    }
}

impl InputDriver for GuardedInput {
    fn cursor_position(&self) -> Result<(i32, i32), InputError> {
        self.inner.cursor_position()
    }

    fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        self.run(|d| d.mouse_move(x, y))
    }

    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.run(|d| d.mouse_click(button))
    }

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.run(|d| d.mouse_down(button))
    }

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.run(|d| d.mouse_up(button))
    }

    fn mouse_scroll(&mut self, delta: i32, horizontal: bool) -> Result<(), InputError> {
        self.run(|d| d.mouse_scroll(delta, horizontal))
    }

    fn type_text(&mut self, text: &str) -> Result<(), InputError> {
        self.run(|d| d.type_text(text))
    }

    fn key_press(&mut self, key: &str) -> Result<(), InputError> {
        self.run(|d| d.key_press(key))
    }

    fn key_down(&mut self, key: &str) -> Result<(), InputError> {
        self.run(|d| d.key_down(key))
    }

    fn key_up(&mut self, key: &str) -> Result<(), InputError> {
        self.run(|d| d.key_up(key))
    }

    fn hotkey(&mut self, keys: &[&str]) -> Result<(), InputError> {
        self.run(|d| d.hotkey(keys))
    }
}
