use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::credentials::Credentials;
use crate::sge::endpoints;
use crate::sge::session_pool::SessionPool;
use crate::sge::transport::{SgeRequest, SgeTransport};
use crate::validation::auth::{mask_user, normalize_user};

/// How much of an unexpected body is kept in error messages.
const SNIPPET_CHARS: usize = 160;

/// Whether a response body is SGE's login redirect rather than the requested page.
///
/// SGE never answers an expired session with a status code, only with a script
/// that sends the browser back to the login page, so this is substring matching.
pub fn is_session_expired(body: &str) -> bool {
    let compact: String = body
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    endpoints::SESSION_EXPIRED_MARKERS
        .iter()
        .any(|marker| compact.contains(marker))
}

/// The first characters of a body, for diagnostics.
pub fn snippet(body: &str) -> String {
    let mut out: String = body.chars().take(SNIPPET_CHARS).collect();
    if body.chars().count() > SNIPPET_CHARS {
        out.push('…');
    }
    out
}

/// Sends requests to SGE with a pooled session, recovering once from a silent expiry.
#[derive(Clone)]
pub struct SgeClient {
    pool: SessionPool,
    transport: Arc<dyn SgeTransport>,
}

impl SgeClient {
    /// Creates a new `SgeClient`.
    pub fn new(pool: SessionPool, transport: Arc<dyn SgeTransport>) -> Self {
        Self { pool, transport }
    }

    /// The session pool backing this client.
    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    /// Sends a request and returns the raw body.
    ///
    /// When SGE answers with its login redirect, the cached session is dropped,
    /// a new login is forced and the request is sent exactly once more. A second
    /// redirect fails with `AppError::Session`.
    pub async fn request(&self, credentials: &Credentials, request: &SgeRequest) -> Result<String> {
        let token = self.pool.get_session(credentials).await?;
        let body = self.transport.send(&token, request).await?;

        if !is_session_expired(&body) {
            return Ok(body);
        }

        let masked = mask_user(&normalize_user(&credentials.user)?);
        tracing::warn!(
            "⚠️  SGE session for {} expired early on {}, logging in again",
            masked,
            request.path
        );

        self.pool.invalidate_session(&credentials.user)?;
        let token = self.pool.get_session(credentials).await?;
        let body = self.transport.send(&token, request).await?;

        if is_session_expired(&body) {
            tracing::error!("❌ SGE session for {} expired again right after login", masked);
            return Err(AppError::Session(format!(
                "session expired even after re-login ({})",
                request.path
            )));
        }

        Ok(body)
    }

    /// Sends a request and parses the body as JSON.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        request: &SgeRequest,
    ) -> Result<T> {
        let body = self.request(credentials, request).await?;
        sonic_rs::from_str(&body).map_err(|e| {
            AppError::Protocol(format!(
                "expected JSON from {}: {} (body: {:?})",
                request.path,
                e,
                snippet(&body)
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_login_redirect_scripts() {
        assert!(is_session_expired(
            "<script>window.location = 'index.php';</script>"
        ));
        assert!(is_session_expired(
            "<SCRIPT>top.location.href = '../../index.php'</SCRIPT>"
        ));
        assert!(is_session_expired(
            r#"<form action="flogin.php"><input type="password" name="user_password"></form>"#
        ));
    }

    #[test]
    fn ordinary_pages_are_not_expired() {
        assert!(!is_session_expired("0"));
        assert!(!is_session_expired(
            r#"<select id="turma"><option value="1">7A</option></select>"#
        ));
        assert!(!is_session_expired(""));
    }

    #[test]
    fn snippet_truncates_on_char_boundaries() {
        let body = "ç".repeat(500);
        let cut = snippet(&body);
        assert_eq!(cut.chars().count(), SNIPPET_CHARS + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(snippet("short"), "short");
    }
}
