//! LLM provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),

    #[error("Missing API key: set {0} or provider.api_key in the config file")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response from a provider API.
    pub fn from_api_response(status: u16, message: String) -> Self {
        let lower = message.to_lowercase();
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            429 => ProviderError::RateLimited {
                retry_after_seconds: 60,
            },
            400 if lower.contains("too long")
                || lower.contains("context length")
                || lower.contains("too many tokens") =>
            {
                ProviderError::ContextLengthExceeded(message)
            }
            400 | 404 | 413 | 422 => ProviderError::InvalidRequest(message),
            _ => ProviderError::ApiError { status, message },
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } | ProviderError::Network(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
