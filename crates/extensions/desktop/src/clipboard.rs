//! Clipboard access.

use arboard::Clipboard;
use thiserror::Error;

use crate::backend::ClipboardReader;

/// Clipboard errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard access failed: {0}")]
    AccessFailed(String),

    #[error("No text in clipboard")]
    NoText,
}

/// System clipboard.
pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard =
            Clipboard::new().map_err(|e| ClipboardError::AccessFailed(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardReader for SystemClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.clipboard.get_text().map_err(|e| match e {
            arboard::Error::ContentNotAvailable => ClipboardError::NoText,
            other => ClipboardError::AccessFailed(other.to_string()),
        })
    }
}
