//! API error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sitepilot_protocols::SessionError;
use sitepilot_protocols::error::ProviderError;
use sitepilot_runtime::StoreError;
use thiserror::Error;

pub const BUSY_MESSAGE: &str = "Agent is currently busy. Please try again later.";

/// Errors returned by HTTP handlers. Every variant renders as
/// `{"error": ..., "status": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session gate is held.
    #[error("{BUSY_MESSAGE}")]
    Busy,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Busy => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            ApiError::Busy => "busy",
            _ => "error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "status": self.status_label(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy => ApiError::Busy,
            SessionError::UnresolvedWebsite(_) => ApiError::BadRequest(
                "Could not identify a website from your request. Please try being more specific \
                 (e.g., 'Navigate to Google' or 'go to github.com')"
                    .to_string(),
            ),
            SessionError::InvalidSlug(_) => {
                ApiError::BadRequest(
                    "Provided endpoint slug contains no valid characters.".to_string(),
                )
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotRegistered(_) => ApiError::NotFound(err.to_string()),
            StoreError::Missing(_) => ApiError::NotFound(err.to_string()),
            StoreError::Corrupt(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Internal(format!("Failed to generate documentation: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_busy_response() {
        let (status, body) = body_of(ApiError::Busy).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], BUSY_MESSAGE);
        assert_eq!(body["status"], "busy");
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let (status, body) = body_of(ApiError::BadRequest("nope".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "nope");
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn test_from_session_error() {
        assert!(matches!(ApiError::from(SessionError::Busy), ApiError::Busy));
        assert!(matches!(
            ApiError::from(SessionError::InvalidSlug("!!".into())),
            ApiError::BadRequest(msg) if msg.contains("no valid characters")
        ));
    }

    #[test]
    fn test_from_store_error() {
        let missing = ApiError::from(StoreError::Missing("deals".into()));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "Data file not found. Try refreshing the endpoint.");

        let corrupt = ApiError::from(StoreError::Corrupt("expected value".into()));
        assert_eq!(corrupt.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(corrupt.to_string().contains("Failed to read JSON"));
    }
}
