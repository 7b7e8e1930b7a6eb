//! Desktop automation for SitePilot.
//!
//! Everything here is blocking: callers run it on a blocking thread.
//!
//! ## Platform seams
//! - [`InputDriver`] - pointer and keyboard injection (`enigo`)
//! - [`ScreenCapturer`] - full-screen capture (`screenshots`)
//! - [`ClipboardReader`] - clipboard text (`arboard`)
//! - [`OverlayQuery`] - native "is the overlay window visible" query (`osascript`)
//!
//! ## Overlay
//! - [`SpotlightDetector`] - native query with a pixel-darkness fallback
//! - [`AdaptiveOpener`] - chord, poll, fall back once, track machine speed
//!
//! ## Actions
//! - [`Action`] - closed vocabulary of computer-tool actions
//! - [`ActionExecutor`] - total dispatcher from tool input to [`ActionResult`]

mod action;
mod backend;
mod clipboard;
mod executor;
mod failsafe;
mod input;
mod overlay;
mod screenshot;

#[cfg(test)]
mod testing;

pub use action::{Action, ActionParseError, Coordinate, KeySpec, ScrollDirection};
pub use backend::{
    ClipboardReader, DesktopBackend, InputDriver, OverlayQuery, ScreenCapturer, SystemBackend,
};
pub use clipboard::{ClipboardError, SystemClipboard};
pub use executor::{ActionExecutor, ActionOutput, ActionResult};
pub use failsafe::{FailSafe, GuardedInput};
pub use input::{canonical_key, chord_matches, split_keys, InputController, InputError, MouseButton};
pub use overlay::{
    dark_fraction, AdaptiveOpener, AppleScriptQuery, DetectionMethod, DetectionResult, OpenAttempt,
    OverlayDetector, OverlayOpen, OverlayOpener, QueryError, SpeedEstimate, SpotlightDetector,
};
pub use screenshot::{encode_png_base64, CaptureError, PrimaryScreen};
