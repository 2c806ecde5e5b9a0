use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sonic_rs::JsonValueTrait;
use tokio::time::Instant;

use crate::{error::AppError, state::AppState, validation::auth::normalize_user};

/// Failed logins allowed per key before it is locked.
pub const MAX_FAILED_LOGINS: u32 = 5;
/// How long a locked key stays locked, counted from its first failure.
pub const LOGIN_LOCKOUT: Duration = Duration::from_secs(15 * 60);
/// Largest login body read to find the user.
const MAX_LOGIN_BODY: usize = 16 * 1024;

#[derive(Debug, Clone, Copy)]
struct Attempts {
    failures: u32,
    window_start: Instant,
}

/// Failed login counters, keyed by normalized user or client IP.
#[derive(Clone, Default)]
pub struct LoginAttempts {
    inner: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl LoginAttempts {
    /// Creates an empty `LoginAttempts`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left on the lock for `key`, if it is locked.
    pub fn locked_for(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let attempts = *map.get(key)?;
        let elapsed = now.duration_since(attempts.window_start);
        if elapsed >= LOGIN_LOCKOUT {
            map.remove(key);
            return None;
        }

        (attempts.failures >= MAX_FAILED_LOGINS).then(|| LOGIN_LOCKOUT - elapsed)
    }

    /// Counts one failed login for `key`.
    pub fn record_failure(&self, key: &str) {
        let now = Instant::now();
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = map.entry(key.to_string()).or_insert(Attempts {
            failures: 0,
            window_start: now,
        });
        if now.duration_since(entry.window_start) >= LOGIN_LOCKOUT {
            *entry = Attempts {
                failures: 0,
                window_start: now,
            };
        }
        entry.failures += 1;
    }

    /// Forgets the failures of `key` after a successful login.
    pub fn clear(&self, key: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drops counters whose window has closed.
    pub fn purge_stale(&self) {
        let now = Instant::now();
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, attempts| now.duration_since(attempts.window_start) < LOGIN_LOCKOUT);
    }
}

/// Extracts the real IP address from the request extensions.
///
/// # Arguments
///
/// * `req` - The incoming request.
///
/// # Returns
///
/// The IP address as a string, or "unknown" if not found.
fn extract_real_ip(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reads the normalized `user` of a login body, if there is one.
fn extract_user_from_body(body_bytes: &[u8]) -> Option<String> {
    let json = sonic_rs::from_slice::<sonic_rs::Value>(body_bytes).ok()?;
    let user = json.get("user")?.as_str()?;
    normalize_user(user).ok()
}

/// A middleware that rate limits login attempts.
///
/// Attempts are counted per user when the body names one, otherwise per IP.
/// Client errors count as failures; a success clears the counter.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an error `AppError`.
pub async fn rate_limit_login(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_real_ip(&req);
    let (parts, body) = req.into_parts();

    let body_bytes = match axum::body::to_bytes(body, MAX_LOGIN_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::Validation("Login request body is too large".to_string())
                .into_response();
        }
    };

    let key = match extract_user_from_body(&body_bytes) {
        Some(user) => format!("user:{}", user),
        None => format!("ip:{}", ip),
    };

    if let Some(remaining) = state.login_attempts.locked_for(&key) {
        return AppError::RateLimitExceeded(format!(
            "Too many failed login attempts. Try again in {} minutes",
            remaining.as_secs().div_ceil(60)
        ))
        .into_response();
    }

    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;

    if response.status().is_client_error() {
        state.login_attempts.record_failure(&key);
    } else if response.status().is_success() {
        state.login_attempts.clear(&key);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn locks_after_repeated_failures_and_expires() {
        let attempts = LoginAttempts::new();
        for _ in 0..MAX_FAILED_LOGINS - 1 {
            attempts.record_failure("user:1");
        }
        assert!(attempts.locked_for("user:1").is_none());

        attempts.record_failure("user:1");
        assert!(attempts.locked_for("user:1").is_some());
        assert!(attempts.locked_for("user:2").is_none());

        tokio::time::advance(LOGIN_LOCKOUT).await;
        assert!(attempts.locked_for("user:1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_failures() {
        let attempts = LoginAttempts::new();
        for _ in 0..MAX_FAILED_LOGINS {
            attempts.record_failure("ip:10.0.0.1");
        }
        attempts.clear("ip:10.0.0.1");
        assert!(attempts.locked_for("ip:10.0.0.1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_closed_windows_only() {
        let attempts = LoginAttempts::new();
        attempts.record_failure("user:old");
        tokio::time::advance(LOGIN_LOCKOUT).await;
        attempts.record_failure("user:new");

        attempts.purge_stale();
        let map = attempts.inner.lock().unwrap();
        assert!(!map.contains_key("user:old"));
        assert!(map.contains_key("user:new"));
    }

    #[test]
    fn user_is_read_from_json_body() {
        assert_eq!(
            extract_user_from_body(br#"{"user": "111.222.333-44", "password": "x"}"#).as_deref(),
            Some("11122233344")
        );
        assert_eq!(extract_user_from_body(b"not json"), None);
        assert_eq!(extract_user_from_body(br#"{"password": "x"}"#), None);
    }
}
