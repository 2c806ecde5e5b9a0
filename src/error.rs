use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
///
/// `Clone` so that one settled login can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// The legacy system rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The legacy system answered with something we could not interpret.
    #[error("Unexpected SGE response: {0}")]
    Protocol(String),

    /// The legacy session kept expiring after a forced re-login.
    #[error("SGE session error: {0}")]
    Session(String),

    /// An encrypted secret failed authentication (tampered or wrong key).
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// An encrypted secret is not in the `iv:tag:ciphertext` shape.
    #[error("Malformed encrypted secret: {0}")]
    Format(String),

    /// A transport failure talking to the legacy system.
    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// An outbound call exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller has no usable credential cookie.
    #[error("Authorization failed")]
    Unauthorized,

    /// The request is not allowed (e.g. a CSRF check failed).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// Too many attempts from the same caller.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Network(Arc::new(err))
        }
    }
}

impl AppError {
    /// Whether this error means the legacy system is unreachable or misbehaving,
    /// as opposed to a problem with the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Protocol(_) | AppError::Session(_) | AppError::Network(_) | AppError::Timeout(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }

            AppError::Protocol(ref msg) => {
                tracing::error!("SGE protocol error: {}", msg);
                upstream_unavailable()
            }

            AppError::Session(ref msg) => {
                tracing::error!("SGE session error: {}", msg);
                upstream_unavailable()
            }

            AppError::Network(ref e) => {
                tracing::error!("SGE network error: {}", e);
                upstream_unavailable()
            }

            AppError::Timeout(ref msg) => {
                tracing::error!("SGE timeout: {}", msg);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Upstream system unavailable, retry later".to_string(),
                )
            }

            AppError::Integrity(ref msg) => {
                tracing::warn!("Credential integrity failure: {}", msg);
                (StatusCode::UNAUTHORIZED, "Session credentials are invalid".to_string())
            }

            AppError::Format(ref msg) => {
                tracing::warn!("Credential format failure: {}", msg);
                (StatusCode::UNAUTHORIZED, "Session credentials are invalid".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Unauthorized => {
                tracing::warn!("Authorization failed");
                (StatusCode::UNAUTHORIZED, "Not signed in to SGE".to_string())
            }

            AppError::Forbidden(ref msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "Forbidden".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::RateLimitExceeded(ref msg) => {
                tracing::warn!("Rate limit exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, msg.clone())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}

fn upstream_unavailable() -> (StatusCode, String) {
    (
        StatusCode::BAD_GATEWAY,
        "Upstream system unavailable, retry later".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_do_not_leak_legacy_bodies() {
        let response =
            AppError::Protocol("<html>Fatal error in /var/www/sge/x.php</html>".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn authentication_maps_to_unauthorized() {
        let response = AppError::Authentication("bad password".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_classification() {
        assert!(AppError::Session("x".into()).is_upstream());
        assert!(AppError::Timeout("x".into()).is_upstream());
        assert!(!AppError::Authentication("x".into()).is_upstream());
        assert!(!AppError::Validation("x".into()).is_upstream());
    }
}
