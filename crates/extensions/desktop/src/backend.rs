//! Platform seams.
//!
//! The overlay detector, opener and executor only talk to the OS through
//! these traits, so every piece of timing logic can be driven by stubs.

use std::sync::Arc;

use screenshots::image::RgbaImage;

use crate::clipboard::{ClipboardError, SystemClipboard};
use crate::input::{InputController, InputError, MouseButton};
use crate::overlay::QueryError;
use crate::screenshot::{CaptureError, PrimaryScreen};

/// Pointer and keyboard injection.
///
/// Implementations are created on the thread that uses them and are not
/// required to be `Send`.
pub trait InputDriver {
    /// Current pointer position in screen coordinates.
    fn cursor_position(&self) -> Result<(i32, i32), InputError>;

    fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), InputError>;

    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InputError>;

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), InputError>;

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), InputError>;

    /// Scroll by `delta` wheel ticks. Positive scrolls down (or right when
    /// `horizontal`).
    fn mouse_scroll(&mut self, delta: i32, horizontal: bool) -> Result<(), InputError>;

    /// Inject literal text.
    fn type_text(&mut self, text: &str) -> Result<(), InputError>;

    /// Press and release a single named key.
    fn key_press(&mut self, key: &str) -> Result<(), InputError>;

    fn key_down(&mut self, key: &str) -> Result<(), InputError>;

    fn key_up(&mut self, key: &str) -> Result<(), InputError>;

    /// Press a key combination as one call: all keys but the last are held
    /// while the last is clicked, then released in reverse order.
    fn hotkey(&mut self, keys: &[&str]) -> Result<(), InputError> {
        let Some((last, modifiers)) = keys.split_last() else {
            return Ok(());
        };

        for key in modifiers {
            self.key_down(key)?;
        }
        let pressed = self.key_press(last);

        let mut released = Ok(());
        for key in modifiers.iter().rev() {
            if let Err(e) = self.key_up(key) {
                released = Err(e);
            }
        }

        pressed.and(released)
    }
}

/// Full-screen raster capture of the primary display.
pub trait ScreenCapturer: Send + Sync {
    fn capture(&self) -> Result<RgbaImage, CaptureError>;
}

/// Clipboard text access.
pub trait ClipboardReader {
    fn get_text(&mut self) -> Result<String, ClipboardError>;
}

/// Native query for the visibility of the overlay window.
pub trait OverlayQuery: Send + Sync {
    fn is_visible(&self) -> Result<bool, QueryError>;
}

/// Factory for the per-action platform handles.
///
/// Input and clipboard handles are opened per action on the executing
/// thread; the screen capturer is shared.
pub trait DesktopBackend: Send + Sync {
    fn input(&self) -> Result<Box<dyn InputDriver>, InputError>;

    fn clipboard(&self) -> Result<Box<dyn ClipboardReader>, ClipboardError>;

    fn screen(&self) -> Arc<dyn ScreenCapturer>;
}

/// The real desktop: `enigo`, `arboard` and `screenshots`.
pub struct SystemBackend {
    screen: Arc<dyn ScreenCapturer>,
}

impl SystemBackend {
    pub fn new() -> Self {
        Self {
            screen: Arc::new(PrimaryScreen),
        }
    }
}

impl Default for SystemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopBackend for SystemBackend {
    fn input(&self) -> Result<Box<dyn InputDriver>, InputError> {
        Ok(Box::new(InputController::new()?))
    }

    fn clipboard(&self) -> Result<Box<dyn ClipboardReader>, ClipboardError> {
        Ok(Box::new(SystemClipboard::new()?))
    }

    fn screen(&self) -> Arc<dyn ScreenCapturer> {
        Arc::clone(&self.screen)
    }
}
