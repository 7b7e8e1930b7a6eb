//! Screenshot capture.

use std::io::Cursor;

use base64::Engine;
use screenshots::image::{ImageOutputFormat, RgbaImage};
use screenshots::Screen;
use thiserror::Error;

use crate::backend::ScreenCapturer;

/// Screenshot errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("No monitor found")]
    NoMonitor,
}

impl CaptureError {
    /// Whether the failure looks like a missing Screen Recording grant.
    pub fn is_permission_denied(&self) -> bool {
        let CaptureError::CaptureFailed(message) = self else {
            return false;
        };
        let lower = message.to_lowercase();
        lower.contains("permission")
            || lower.contains("input/output error")
            || lower.contains("not authorized")
    }
}

/// Captures the primary display.
pub struct PrimaryScreen;

impl ScreenCapturer for PrimaryScreen {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let screens = Screen::all().map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        let mut screens = screens.into_iter();
        let first = screens.next().ok_or(CaptureError::NoMonitor)?;
        let screen = if first.display_info.is_primary {
            first
        } else {
            screens
                .find(|s| s.display_info.is_primary)
                .unwrap_or(first)
        };

        screen
            .capture()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
    }
}

/// Encode an image as base64 PNG.
pub fn encode_png_base64(image: &RgbaImage) -> Result<String, CaptureError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

    Ok(base64::engine::general_purpose::STANDARD.encode(buffer.into_inner()))
}
