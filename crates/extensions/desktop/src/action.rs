//! Computer-tool action vocabulary.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::input::split_keys;

/// Malformed parameters for a known action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid parameters for {action}: {message}")]
pub struct ActionParseError {
    pub action: String,
    pub message: String,
}

/// Screen position; accepts `[x, y]` with integer or float members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }
}

/// Keys as a `"a+b"` string or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Combo(String),
    Keys(Vec<String>),
}

impl KeySpec {
    pub fn keys(&self) -> Vec<String> {
        match self {
            KeySpec::Combo(combo) => split_keys(combo),
            KeySpec::Keys(keys) => keys
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Left => "left",
            ScrollDirection::Right => "right",
        }
    }
}

/// One computer-tool action, parsed from the model's tool input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Screenshot,
    LeftClick {
        coordinate: Option<Coordinate>,
    },
    DoubleClick {
        coordinate: Option<Coordinate>,
    },
    TripleClick {
        coordinate: Option<Coordinate>,
    },
    RightClick {
        coordinate: Option<Coordinate>,
    },
    MiddleClick {
        coordinate: Option<Coordinate>,
    },
    LeftClickDrag {
        start_coordinate: Option<Coordinate>,
        end_coordinate: Option<Coordinate>,
        /// Older name for `end_coordinate`.
        coordinate: Option<Coordinate>,
    },
    LeftMouseDown {
        coordinate: Option<Coordinate>,
    },
    LeftMouseUp {
        coordinate: Option<Coordinate>,
    },
    MouseMove {
        coordinate: Option<Coordinate>,
    },
    Type {
        text: String,
    },
    // Older clients send `text` for `key` and `duration` for `seconds`,
    // sometimes alongside the new name. The new name wins.
    Key {
        key: Option<KeySpec>,
        text: Option<KeySpec>,
    },
    HoldKey {
        key: Option<KeySpec>,
        text: Option<KeySpec>,
        seconds: Option<f64>,
        duration: Option<f64>,
    },
    Scroll {
        coordinate: Option<Coordinate>,
        scroll_direction: Option<ScrollDirection>,
        scroll_amount: Option<f64>,
    },
    Wait {
        seconds: Option<f64>,
        duration: Option<f64>,
    },
    CaptureHtml,
    /// Any action name outside the vocabulary, or none at all.
    #[serde(skip)]
    Unknown {
        name: Option<String>,
    },
}

impl Action {
    /// Every action name this executor understands.
    pub const NAMES: &'static [&'static str] = &[
        "screenshot",
        "left_click",
        "double_click",
        "triple_click",
        "right_click",
        "middle_click",
        "left_click_drag",
        "left_mouse_down",
        "left_mouse_up",
        "mouse_move",
        "type",
        "key",
        "hold_key",
        "scroll",
        "wait",
        "capture_html",
    ];

    /// Parse tool input. Unknown or missing action names become
    /// [`Action::Unknown`]; only malformed parameters of a known action are
    /// an error.
    pub fn from_input(input: &Value) -> Result<Self, ActionParseError> {
        let Some(name) = input.get("action").and_then(Value::as_str) else {
            return Ok(Action::Unknown { name: None });
        };

        if !Self::NAMES.contains(&name) {
            return Ok(Action::Unknown {
                name: Some(name.to_string()),
            });
        }

        serde_json::from_value(input.clone()).map_err(|e| ActionParseError {
            action: name.to_string(),
            message: e.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Screenshot => "screenshot",
            Action::LeftClick { .. } => "left_click",
            Action::DoubleClick { .. } => "double_click",
            Action::TripleClick { .. } => "triple_click",
            Action::RightClick { .. } => "right_click",
            Action::MiddleClick { .. } => "middle_click",
            Action::LeftClickDrag { .. } => "left_click_drag",
            Action::LeftMouseDown { .. } => "left_mouse_down",
            Action::LeftMouseUp { .. } => "left_mouse_up",
            Action::MouseMove { .. } => "mouse_move",
            Action::Type { .. } => "type",
            Action::Key { .. } => "key",
            Action::HoldKey { .. } => "hold_key",
            Action::Scroll { .. } => "scroll",
            Action::Wait { .. } => "wait",
            Action::CaptureHtml => "capture_html",
            Action::Unknown { name } => name.as_deref().unwrap_or("<none>"),
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
