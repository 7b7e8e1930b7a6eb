//! Automation session errors.

use thiserror::Error;

/// Errors raised when starting an automation session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Another session currently owns the mouse, keyboard and clipboard.
    #[error("Agent is currently busy. Please try again later.")]
    Busy,

    #[error("Could not identify a website from the request: {0}")]
    UnresolvedWebsite(String),

    #[error("Invalid endpoint slug: {0}")]
    InvalidSlug(String),
}
