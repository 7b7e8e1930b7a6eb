//! In-crate test doubles for the platform seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use screenshots::image::{Rgba, RgbaImage};

use crate::backend::{ClipboardReader, DesktopBackend, InputDriver, OverlayQuery, ScreenCapturer};
use crate::clipboard::ClipboardError;
use crate::input::{InputError, MouseButton};
use crate::overlay::{
    DetectionMethod, DetectionResult, OpenAttempt, OverlayDetector, OverlayOpen, OverlayOpener,
    QueryError,
};
use crate::screenshot::CaptureError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Move(i32, i32),
    Click(MouseButton),
    Down(MouseButton),
    Up(MouseButton),
    Scroll(i32, bool),
    Type(String),
    KeyPress(String),
    KeyDown(String),
    KeyUp(String),
    Hotkey(Vec<String>),
}

impl InputEvent {
    pub fn is_key(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyPress(_)
                | InputEvent::KeyDown(_)
                | InputEvent::KeyUp(_)
                | InputEvent::Hotkey(_)
        )
    }
}

/// Records every injected event; clones share the log and pointer.
#[derive(Clone)]
pub struct SpyInput {
    events: Arc<Mutex<Vec<InputEvent>>>,
    position: Arc<Mutex<(i32, i32)>>,
    failure: Arc<Mutex<Option<InputError>>>,
}

impl SpyInput {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            position: Arc::new(Mutex::new((500, 500))),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn events(&self) -> Arc<Mutex<Vec<InputEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn recorded(&self) -> Vec<InputEvent> {
        self.events.lock().clone()
    }

    pub fn set_position(&self, x: i32, y: i32) {
        *self.position.lock() = (x, y);
    }

    /// Make every subsequent injection fail with `error`.
    pub fn fail_with(&self, error: InputError) {
        *self.failure.lock() = Some(error);
    }

    fn record(&self, event: InputEvent) -> Result<(), InputError> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        if let InputEvent::Move(x, y) = event {
            *self.position.lock() = (x, y);
        }
        self.events.lock().push(event);
        Ok(())
    }
}

impl InputDriver for SpyInput {
    fn cursor_position(&self) -> Result<(i32, i32), InputError> {
        Ok(*self.position.lock())
    }

    fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        self.record(InputEvent::Move(x, y))
    }

    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.record(InputEvent::Click(button))
    }

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.record(InputEvent::Down(button))
    }

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.record(InputEvent::Up(button))
    }

    fn mouse_scroll(&mut self, delta: i32, horizontal: bool) -> Result<(), InputError> {
        self.record(InputEvent::Scroll(delta, horizontal))
    }

    fn type_text(&mut self, text: &str) -> Result<(), InputError> {
        self.record(InputEvent::Type(text.to_string()))
    }

    fn key_press(&mut self, key: &str) -> Result<(), InputError> {
        self.record(InputEvent::KeyPress(key.to_string()))
    }

    fn key_down(&mut self, key: &str) -> Result<(), InputError> {
        self.record(InputEvent::KeyDown(key.to_string()))
    }

    fn key_up(&mut self, key: &str) -> Result<(), InputError> {
        self.record(InputEvent::KeyUp(key.to_string()))
    }

    fn hotkey(&mut self, keys: &[&str]) -> Result<(), InputError> {
        self.record(InputEvent::Hotkey(
            keys.iter().map(|k| k.to_string()).collect(),
        ))
    }
}

/// Screen returning a fixed image or a fixed error.
pub struct StubScreen {
    image: Option<RgbaImage>,
    error: Option<CaptureError>,
    delay: Duration,
    pub captures: AtomicUsize,
}

impl StubScreen {
    pub fn with_image(image: RgbaImage) -> Self {
        Self {
            image: Some(image),
            error: None,
            delay: Duration::ZERO,
            captures: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: CaptureError) -> Self {
        Self {
            image: None,
            error: Some(error),
            delay: Duration::ZERO,
            captures: AtomicUsize::new(0),
        }
    }

    /// Block every capture for `delay` first.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl ScreenCapturer for StubScreen {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        match (&self.image, &self.error) {
            (Some(image), _) => Ok(image.clone()),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Err(CaptureError::NoMonitor),
        }
    }
}

/// `width` x `height` white image whose first `dark_pixels` pixels (row
/// major) are black.
pub fn image_with_dark_pixels(width: u32, height: u32, dark_pixels: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if y * width + x < dark_pixels {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Clipboard returning fixed text or a fixed error.
pub struct StubClipboard(pub Result<String, ClipboardError>);

impl ClipboardReader for StubClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.0.clone()
    }
}

/// Native query with a fixed answer.
pub struct StubQuery(pub Result<bool, QueryError>);

impl OverlayQuery for StubQuery {
    fn is_visible(&self) -> Result<bool, QueryError> {
        self.0.clone()
    }
}

/// Native query that answers only after `delay`, like a hung `osascript`.
pub struct SlowQuery {
    pub delay: Duration,
    pub answer: bool,
}

impl OverlayQuery for SlowQuery {
    fn is_visible(&self) -> Result<bool, QueryError> {
        thread::sleep(self.delay);
        Ok(self.answer)
    }
}

/// Detector that reports open from the `open_on`-th call onwards
/// (1-based); `None` never opens.
pub struct ScriptedDetector {
    open_on: Option<usize>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn opens_on(call: usize) -> Self {
        Self {
            open_on: Some(call),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn never() -> Self {
        Self {
            open_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OverlayDetector for ScriptedDetector {
    fn is_overlay_open(&self) -> DetectionResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let visible = self.open_on.is_some_and(|n| call >= n);
        DetectionResult {
            visible,
            method: DetectionMethod::NativeQuery,
        }
    }
}

/// Opener that records how often it was asked to open.
pub struct SpyOpener {
    opens: AtomicUsize,
    opened: bool,
    chord: Vec<String>,
}

impl SpyOpener {
    pub fn new(opened: bool) -> Self {
        Self {
            opens: AtomicUsize::new(0),
            opened,
            chord: vec!["command".to_string(), "space".to_string()],
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl OverlayOpener for SpyOpener {
    fn open_overlay(&self, _input: &mut dyn InputDriver) -> OverlayOpen {
        self.opens.fetch_add(1, Ordering::SeqCst);
        OverlayOpen {
            opened: self.opened,
            elapsed: Duration::from_millis(120),
            attempt: OpenAttempt::Primary,
        }
    }

    fn clear_overlay_if_open(&self, _input: &mut dyn InputDriver) -> bool {
        false
    }

    fn chord(&self) -> &[String] {
        &self.chord
    }
}

/// Backend handing out clones of one spy input.
pub struct SpyBackend {
    pub input: SpyInput,
    pub screen: Arc<dyn ScreenCapturer>,
    pub clipboard: Result<String, ClipboardError>,
}

impl SpyBackend {
    pub fn new(screen: Arc<dyn ScreenCapturer>) -> Self {
        Self {
            input: SpyInput::new(),
            screen,
            clipboard: Ok(String::new()),
        }
    }
}

impl DesktopBackend for SpyBackend {
    fn input(&self) -> Result<Box<dyn InputDriver>, InputError> {
        Ok(Box::new(self.input.clone()))
    }

    fn clipboard(&self) -> Result<Box<dyn ClipboardReader>, ClipboardError> {
        Ok(Box::new(StubClipboard(self.clipboard.clone())))
    }

    fn screen(&self) -> Arc<dyn ScreenCapturer> {
        Arc::clone(&self.screen)
    }
}
