//! Action executor.
//!
//! [`ActionExecutor::execute`] is total: every failure becomes an
//! [`ActionResult`] flagged as an error, so the calling loop can hand it back
//! to the model and carry on.

use std::sync::Arc;
use std::thread;

use serde_json::Value;
use sitepilot_config::{secs, InputConfig};
use tracing::{debug, warn};

use crate::action::{Action, Coordinate, KeySpec, ScrollDirection};
use crate::backend::{DesktopBackend, InputDriver};
use crate::failsafe::{FailSafe, GuardedInput};
use crate::input::{chord_matches, InputError, MouseButton};
use crate::overlay::OverlayOpener;
use crate::screenshot::{encode_png_base64, CaptureError};

const DRAG_STEPS: u32 = 10;
const DEFAULT_HOLD_SECS: f64 = 0.5;
const DEFAULT_WAIT_SECS: f64 = 1.0;
const LOG_SNIPPET_CHARS: usize = 200;

const ACCESSIBILITY_MESSAGE: &str = "Permission error: Please grant Accessibility permission to Terminal in System Preferences > Security & Privacy > Privacy > Accessibility";
const SCREEN_RECORDING_MESSAGE: &str = "Screen recording permission required. Please grant Screen Recording permission to Terminal in System Preferences > Security & Privacy > Privacy > Screen Recording";
const FAILSAFE_MESSAGE: &str = "Fail-safe triggered: the mouse was moved to the top-left corner, all input for this session has been stopped";

/// Payload of an action result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    /// Short status line.
    Text(String),
    /// Base64-encoded image.
    Image { media_type: String, data: String },
    /// Large captured text (page content).
    Captured(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub output: ActionOutput,
    pub is_error: bool,
}

impl ActionResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            output: ActionOutput::Text(text.into()),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            output: ActionOutput::Text(text.into()),
            is_error: true,
        }
    }

    pub fn png(data: String) -> Self {
        Self {
            output: ActionOutput::Image {
                media_type: "image/png".to_string(),
                data,
            },
            is_error: false,
        }
    }

    pub fn captured(text: String) -> Self {
        Self {
            output: ActionOutput::Captured(text),
            is_error: false,
        }
    }

    /// Text of a status or captured result; `None` for images.
    pub fn as_text(&self) -> Option<&str> {
        match &self.output {
            ActionOutput::Text(text) | ActionOutput::Captured(text) => Some(text),
            ActionOutput::Image { .. } => None,
        }
    }
}

enum ExecError {
    Input(InputError),
    Capture(CaptureError),
}

impl From<InputError> for ExecError {
    fn from(e: InputError) -> Self {
        ExecError::Input(e)
    }
}

impl From<CaptureError> for ExecError {
    fn from(e: CaptureError) -> Self {
        ExecError::Capture(e)
    }
}

/// Dispatches computer-tool actions onto the desktop.
///
/// One executor serves one session: its fail-safe flag is shared by every
/// input handle it opens.
pub struct ActionExecutor {
    backend: Arc<dyn DesktopBackend>,
    opener: Arc<dyn OverlayOpener>,
    failsafe: FailSafe,
    config: InputConfig,
}

impl ActionExecutor {
    pub fn new(
        backend: Arc<dyn DesktopBackend>,
        opener: Arc<dyn OverlayOpener>,
        config: InputConfig,
    ) -> Self {
        Self {
            backend,
            opener,
            failsafe: FailSafe::from_config(&config),
            config,
        }
    }

    pub fn failsafe(&self) -> &FailSafe {
        &self.failsafe
    }

    pub fn opener(&self) -> &Arc<dyn OverlayOpener> {
        &self.opener
    }

    /// Open a fail-safe guarded input handle on the current thread.
    pub fn input(&self) -> Result<GuardedInput, InputError> {
        self.failsafe.check(None)?;
        let driver = self.backend.input()?;
        Ok(self.failsafe.guard(driver, self.config.action_pause()))
    }

    /// Execute one tool input. Blocking.
    pub fn execute(&self, input: &Value) -> ActionResult {
        let action = match Action::from_input(input) {
            Ok(action) => action,
            Err(e) => {
                warn!("{}", e);
                return ActionResult::error(e.to_string());
            }
        };

        let name = action.name().to_string();
        debug!(action = %name, "Executing computer action");

        match self.dispatch(action) {
            Ok(result) => result,
            Err(e) => {
                let message = describe_error(&name, &e);
                warn!(action = %name, "{}", message);
                ActionResult::error(message)
            }
        }
    }

    fn dispatch(&self, action: Action) -> Result<ActionResult, ExecError> {
        let result = match action {
            Action::Screenshot => self.screenshot()?,
            Action::LeftClick { coordinate } => {
                self.click(coordinate, MouseButton::Left, 1, "Left clicked")?
            }
            Action::DoubleClick { coordinate } => {
                self.click(coordinate, MouseButton::Left, 2, "Double clicked")?
            }
            Action::TripleClick { coordinate } => {
                self.click(coordinate, MouseButton::Left, 3, "Triple clicked")?
            }
            Action::RightClick { coordinate } => {
                self.click(coordinate, MouseButton::Right, 1, "Right clicked")?
            }
            Action::MiddleClick { coordinate } => {
                self.click(coordinate, MouseButton::Middle, 1, "Middle clicked")?
            }
            Action::LeftClickDrag {
                start_coordinate,
                end_coordinate,
                coordinate,
            } => self.drag(start_coordinate, end_coordinate.or(coordinate))?,
            Action::LeftMouseDown { coordinate } => {
                let mut input = self.input()?;
                move_if_given(&mut input, coordinate)?;
                input.mouse_down(MouseButton::Left)?;
                ActionResult::text("Mouse button down")
            }
            Action::LeftMouseUp { coordinate } => {
                let mut input = self.input()?;
                move_if_given(&mut input, coordinate)?;
                input.mouse_up(MouseButton::Left)?;
                ActionResult::text("Mouse button up")
            }
            Action::MouseMove { coordinate } => match coordinate {
                Some(Coordinate { x, y }) => {
                    self.input()?.mouse_move(x, y)?;
                    ActionResult::text(format!("Moved mouse to ({}, {})", x, y))
                }
                None => ActionResult::error("mouse_move requires a 'coordinate' parameter"),
            },
            Action::Type { text } => {
                self.input()?.type_text(&text)?;
                ActionResult::text(format!("Typed text: {}", text))
            }
            Action::Key { key, text } => self.key(key.or(text))?,
            Action::HoldKey {
                key,
                text,
                seconds,
                duration,
            } => self.hold_key(key.or(text), seconds.or(duration))?,
            Action::Scroll {
                coordinate,
                scroll_direction,
                scroll_amount,
            } => self.scroll(coordinate, scroll_direction.unwrap_or_default(), scroll_amount)?,
            Action::Wait { seconds, duration } => {
                let seconds = self.bounded_secs(seconds.or(duration), DEFAULT_WAIT_SECS);
                thread::sleep(secs(seconds));
                ActionResult::text(format!("Waited {} seconds", seconds))
            }
            Action::CaptureHtml => self.capture_html()?,
            Action::Unknown { name } => ActionResult::error(format!(
                "Unknown action: {}",
                name.as_deref().unwrap_or("<none>")
            )),
        };
        Ok(result)
    }

    /// Model-supplied sleep, clamped to `[0, max_action_wait]`.
    fn bounded_secs(&self, requested: Option<f64>, default: f64) -> f64 {
        let seconds = requested.unwrap_or(default);
        let ceiling = self.config.max_action_wait_secs;
        if !seconds.is_finite() || seconds <= 0.0 {
            0.0
        } else if seconds > ceiling {
            debug!(requested = seconds, ceiling, "Clamping requested sleep");
            ceiling
        } else {
            seconds
        }
    }

    fn screenshot(&self) -> Result<ActionResult, ExecError> {
        let image = self.backend.screen().capture()?;
        let data = encode_png_base64(&image)?;
        debug!(
            width = image.width(),
            height = image.height(),
            bytes = data.len(),
            "Screenshot captured"
        );
        Ok(ActionResult::png(data))
    }

    fn click(
        &self,
        coordinate: Option<Coordinate>,
        button: MouseButton,
        count: u32,
        label: &str,
    ) -> Result<ActionResult, ExecError> {
        let mut input = self.input()?;
        move_if_given(&mut input, coordinate)?;
        for _ in 0..count {
            input.mouse_click(button)?;
        }

        Ok(ActionResult::text(match coordinate {
            Some(Coordinate { x, y }) => format!("{} at ({}, {})", label, x, y),
            None => format!("{} at current position", label),
        }))
    }

    fn drag(
        &self,
        start: Option<Coordinate>,
        end: Option<Coordinate>,
    ) -> Result<ActionResult, ExecError> {
        let Some(end) = end else {
            return Ok(ActionResult::error(
                "Missing end_coordinate for left_click_drag",
            ));
        };

        let mut input = self.input()?;
        let start = match start {
            Some(start) => start,
            None => {
                let (x, y) = input.cursor_position()?;
                Coordinate::new(x, y)
            }
        };

        input.mouse_move(start.x, start.y)?;
        input.mouse_down(MouseButton::Left)?;

        let step_pause = self.config.drag_duration() / DRAG_STEPS;
        let mut moved = Ok(());
        for step in 1..=DRAG_STEPS {
            let t = f64::from(step) / f64::from(DRAG_STEPS);
            let x = start.x + ((end.x - start.x) as f64 * t).round() as i32;
            let y = start.y + ((end.y - start.y) as f64 * t).round() as i32;
            moved = input.mouse_move(x, y);
            if moved.is_err() {
                break;
            }
            thread::sleep(step_pause);
        }

        let released = input.mouse_up(MouseButton::Left);
        moved.and(released)?;

        Ok(ActionResult::text(format!(
            "Dragged mouse from ({}, {}) to ({}, {})",
            start.x, start.y, end.x, end.y
        )))
    }

    fn key(&self, key: Option<KeySpec>) -> Result<ActionResult, ExecError> {
        let keys = key.map(|k| k.keys()).unwrap_or_default();
        let mut input = self.input()?;

        let result = match keys.as_slice() {
            [] => {
                input.key_press("return")?;
                ActionResult::text("Pressed Enter key (default)")
            }
            [single] => {
                input.key_press(single)?;
                ActionResult::text(format!("Pressed key: {}", single))
            }
            _ if chord_matches(&keys, self.opener.chord()) => {
                let open = self.opener.open_overlay(&mut input);
                if open.opened {
                    ActionResult::text(format!(
                        "Pressed key combination: {} (opened in {:.3}s)",
                        keys.join("+"),
                        open.elapsed.as_secs_f64()
                    ))
                } else {
                    ActionResult::error(format!(
                        "Failed to open Spotlight after {:.3}s - please try again",
                        open.elapsed.as_secs_f64()
                    ))
                }
            }
            _ => {
                let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
                input.hotkey(&refs)?;
                ActionResult::text(format!("Pressed key combination: {}", keys.join("+")))
            }
        };
        Ok(result)
    }

    fn hold_key(
        &self,
        key: Option<KeySpec>,
        seconds: Option<f64>,
    ) -> Result<ActionResult, ExecError> {
        let keys = key.map(|k| k.keys()).unwrap_or_default();
        if keys.is_empty() {
            return Ok(ActionResult::error(
                "hold_key action requires 'key' parameter",
            ));
        }
        let seconds = self.bounded_secs(seconds, DEFAULT_HOLD_SECS);

        let mut input = self.input()?;
        let mut held = Vec::with_capacity(keys.len());
        let mut pressed = Ok(());
        for key in &keys {
            pressed = input.key_down(key);
            if pressed.is_err() {
                break;
            }
            held.push(key);
        }
        if pressed.is_ok() {
            thread::sleep(secs(seconds));
        }

        let mut released = Ok(());
        for key in held.iter().rev() {
            if let Err(e) = input.key_up(key) {
                released = Err(e);
            }
        }
        pressed.and(released)?;

        Ok(ActionResult::text(format!(
            "Held key '{}' for {} seconds",
            keys.join("+"),
            seconds
        )))
    }

    fn scroll(
        &self,
        coordinate: Option<Coordinate>,
        direction: ScrollDirection,
        amount: Option<f64>,
    ) -> Result<ActionResult, ExecError> {
        let amount = amount.unwrap_or(1.0);
        let magnitude =
            (amount.abs() * f64::from(self.config.scroll_ticks_per_unit)).round() as i32;
        let (delta, horizontal) = match direction {
            ScrollDirection::Up => (-magnitude, false),
            ScrollDirection::Down => (magnitude, false),
            ScrollDirection::Left => (-magnitude, true),
            ScrollDirection::Right => (magnitude, true),
        };

        let mut input = self.input()?;
        move_if_given(&mut input, coordinate)?;
        input.mouse_scroll(delta, horizontal)?;

        Ok(ActionResult::text(format!(
            "Scrolled {} by {} units",
            direction.as_str(),
            amount
        )))
    }

    fn capture_html(&self) -> Result<ActionResult, ExecError> {
        let settle = self.config.capture_settle();
        {
            let mut input = self.input()?;
            input.hotkey(&["command", "a"])?;
            thread::sleep(settle);
            input.hotkey(&["command", "c"])?;
            thread::sleep(settle);
        }

        let text = self
            .backend
            .clipboard()
            .and_then(|mut clipboard| clipboard.get_text());

        Ok(match text {
            Ok(text) => {
                let snippet: String = text.chars().take(LOG_SNIPPET_CHARS).collect();
                debug!(chars = text.chars().count(), %snippet, "Page content captured");
                ActionResult::captured(text)
            }
            Err(e) => ActionResult::error(format!("Failed to capture HTML: {}", e)),
        })
    }
}

fn move_if_given(
    input: &mut dyn InputDriver,
    coordinate: Option<Coordinate>,
) -> Result<(), InputError> {
    match coordinate {
        Some(Coordinate { x, y }) => input.mouse_move(x, y),
        None => Ok(()),
    }
}

fn describe_error(action: &str, err: &ExecError) -> String {
    match err {
        ExecError::Input(InputError::FailSafe) => FAILSAFE_MESSAGE.to_string(),
        ExecError::Input(InputError::PermissionDenied(_)) => ACCESSIBILITY_MESSAGE.to_string(),
        ExecError::Capture(e) if e.is_permission_denied() => SCREEN_RECORDING_MESSAGE.to_string(),
        ExecError::Input(e) => format!("Error executing {}: {}", action, e),
        ExecError::Capture(e) => format!("Error executing {}: {}", action, e),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
