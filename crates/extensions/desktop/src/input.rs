//! Mouse and keyboard input control.

use std::fmt::Display;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use thiserror::Error;

use crate::backend::InputDriver;

/// Input control errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input failed: {0}")]
    Failed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The OS refused synthetic input (Accessibility not granted).
    #[error("Accessibility permission denied: {0}")]
    PermissionDenied(String),

    /// The pointer reached the fail-safe corner; all further input in this
    /// session is refused.
    #[error("Fail-safe triggered by moving the mouse to the top-left corner")]
    FailSafe,
}

impl InputError {
    /// Classify a backend error message.
    pub(crate) fn from_backend(err: impl Display) -> Self {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("permission")
            || lower.contains("accessibility")
            || lower.contains("not trusted")
        {
            InputError::PermissionDenied(message)
        } else {
            InputError::Failed(message)
        }
    }
}

/// Mouse button types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<MouseButton> for Button {
    fn from(btn: MouseButton) -> Self {
        match btn {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        }
    }
}

/// Input controller for mouse and keyboard.
pub struct InputController {
    enigo: Enigo,
}

impl InputController {
    /// Create a new input controller.
    pub fn new() -> Result<Self, InputError> {
        let enigo = Enigo::new(&Settings::default()).map_err(InputError::from_backend)?;
        Ok(Self { enigo })
    }
}

impl InputDriver for InputController {
    fn cursor_position(&self) -> Result<(i32, i32), InputError> {
        self.enigo.location().map_err(InputError::from_backend)
    }

    fn mouse_move(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(InputError::from_backend)
    }

    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.enigo
            .button(button.into(), Direction::Click)
            .map_err(InputError::from_backend)
    }

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.enigo
            .button(button.into(), Direction::Press)
            .map_err(InputError::from_backend)
    }

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.enigo
            .button(button.into(), Direction::Release)
            .map_err(InputError::from_backend)
    }

    fn mouse_scroll(&mut self, delta: i32, horizontal: bool) -> Result<(), InputError> {
        let axis = if horizontal { Axis::Horizontal } else { Axis::Vertical };
        self.enigo
            .scroll(delta, axis)
            .map_err(InputError::from_backend)
    }

    fn type_text(&mut self, text: &str) -> Result<(), InputError> {
        self.enigo.text(text).map_err(InputError::from_backend)
    }

    fn key_press(&mut self, key: &str) -> Result<(), InputError> {
        let k = parse_key(key)?;
        self.enigo
            .key(k, Direction::Click)
            .map_err(InputError::from_backend)
    }

    fn key_down(&mut self, key: &str) -> Result<(), InputError> {
        let k = parse_key(key)?;
        self.enigo
            .key(k, Direction::Press)
            .map_err(InputError::from_backend)
    }

    fn key_up(&mut self, key: &str) -> Result<(), InputError> {
        let k = parse_key(key)?;
        self.enigo
            .key(k, Direction::Release)
            .map_err(InputError::from_backend)
    }
}

/// Split a `"command+space"` style combination into trimmed key names.
pub fn split_keys(combo: &str) -> Vec<String> {
    combo
        .split('+')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Canonical lowercase name for a key, folding the aliases models and
/// config files use for the same physical key.
pub fn canonical_key(key: &str) -> String {
    let lower = key.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "cmd" | "command" | "meta" | "super" | "win" => "command",
        "ctrl" | "control" => "ctrl",
        "alt" | "option" | "opt" => "alt",
        "enter" | "return" => "return",
        "escape" | "esc" => "escape",
        "delete" | "del" => "delete",
        "backspace" | "back_space" => "backspace",
        "space" | " " => "space",
        "pageup" | "page_up" | "pgup" => "pageup",
        "pagedown" | "page_down" | "pgdn" => "pagedown",
        "up" | "arrowup" => "up",
        "down" | "arrowdown" => "down",
        "left" | "arrowleft" => "left",
        "right" | "arrowright" => "right",
        _ => return lower,
    };
    canonical.to_string()
}

/// Whether `keys` names the same chord as `chord`, ignoring order and alias
/// spelling.
pub fn chord_matches<K, C>(keys: &[K], chord: &[C]) -> bool
where
    K: AsRef<str>,
    C: AsRef<str>,
{
    !chord.is_empty()
        && normalised(keys.iter().map(AsRef::as_ref)) == normalised(chord.iter().map(AsRef::as_ref))
}

fn normalised<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = keys.map(canonical_key).collect();
    names.sort();
    names.dedup();
    names
}

/// Parse a key string to enigo Key.
fn parse_key(key: &str) -> Result<Key, InputError> {
    let canonical = canonical_key(key);
    let k = match canonical.as_str() {
        // Special keys
        "return" => Key::Return,
        "tab" => Key::Tab,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "escape" => Key::Escape,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "capslock" => Key::CapsLock,

        // Modifiers
        "ctrl" => Key::Control,
        "alt" => Key::Alt,
        "shift" => Key::Shift,
        "command" => Key::Meta,

        // Function keys
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        // Letters, digits and punctuation
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Unicode(c),
                _ => return Err(InputError::InvalidKey(key.to_string())),
            }
        }
    };

    Ok(k)
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
