//! Agent loop errors.

use thiserror::Error;

use super::{ProviderError, SessionError};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Agent was aborted by the fail-safe corner")]
    Aborted,

    #[error("No HTML was captured during the session")]
    NothingCaptured,

    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
