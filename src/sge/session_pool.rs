//! Pooled SGE sessions.
//!
//! One cached `PHPSESSID` per normalized user, with a local TTL, LRU eviction
//! and at most one login in flight per user and password. A cached session is
//! only handed to callers presenting the password that opened it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use rand::{rngs::OsRng, RngCore};
use tokio::time::Instant;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};
use crate::models::credentials::Credentials;
use crate::models::session::{CachedSession, PasswordDigest};
use crate::sge::endpoints;
use crate::sge::transport::{LoginResponse, SgeTransport};
use crate::validation::auth::{mask_user, normalize_user, validate_password};

/// The default local lifetime of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);
/// The default pool capacity.
pub const DEFAULT_MAX_SESSIONS: usize = 200;

/// An in-flight login every concurrent caller with the same credentials awaits.
type PendingLogin = Shared<BoxFuture<'static, Result<String>>>;

/// Normalized user plus the digest of the password being tried.
type PendingKey = (String, PasswordDigest);

/// Pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// How long a session is handed out after login.
    pub ttl: Duration,
    /// Maximum number of cached sessions.
    pub max_sessions: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Default)]
struct PoolState {
    sessions: HashMap<String, CachedSession>,
    pending: HashMap<PendingKey, PendingLogin>,
}

impl PoolState {
    /// Returns the token for `key` and marks it used, dropping it if it has expired.
    ///
    /// A session opened with another password is a miss and stays cached.
    fn touch(&mut self, key: &str, digest: &PasswordDigest, now: Instant) -> Option<String> {
        if self.sessions.get(key)?.is_expired(now) {
            self.sessions.remove(key);
            return None;
        }

        let session = self.sessions.get_mut(key)?;
        if !session.opened_with(digest) {
            return None;
        }
        session.last_used_at = now;
        Some(session.token.clone())
    }

    /// Stores a fresh session, evicting the least recently used one when full.
    fn insert(
        &mut self,
        key: String,
        token: String,
        digest: PasswordDigest,
        now: Instant,
        config: &PoolConfig,
    ) {
        if !self.sessions.contains_key(&key) && self.sessions.len() >= config.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, session)| session.last_used_at)
                .map(|(user, _)| user.clone());

            if let Some(oldest) = oldest {
                self.sessions.remove(&oldest);
                tracing::debug!("♻️  Evicted least recently used SGE session {}", mask_user(&oldest));
            }
        }

        self.sessions
            .insert(key, CachedSession::new(token, digest, now, config.ttl));
    }
}

struct PoolInner {
    transport: Arc<dyn SgeTransport>,
    config: PoolConfig,
    digest_key: Zeroizing<[u8; 32]>,
    state: Mutex<PoolState>,
}

impl PoolInner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keyed BLAKE3 of a password. The key lives only in this process.
    fn digest(&self, password: &str) -> PasswordDigest {
        *blake3::keyed_hash(&self.digest_key, password.as_bytes()).as_bytes()
    }
}

/// Clears a user's in-flight marker when the login task ends, including by panic.
struct PendingGuard {
    inner: Arc<PoolInner>,
    key: PendingKey,
    settled: bool,
}

impl PendingGuard {
    /// Records the login result and clears the in-flight marker under one lock.
    fn settle(mut self, token: Option<&str>) {
        let mut state = self.inner.lock();
        state.pending.remove(&self.key);
        if let Some(token) = token {
            let (user, digest) = &self.key;
            state.insert(
                user.clone(),
                token.to_string(),
                *digest,
                Instant::now(),
                &self.inner.config,
            );
        }
        self.settled = true;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.lock().pending.remove(&self.key);
        }
    }
}

/// Extracts the session token from a raw login response.
///
/// # Returns
///
/// The `PHPSESSID` value, `AppError::Authentication` when SGE did not answer with
/// the success sentinel, or `AppError::Protocol` when it did but set no session cookie.
pub fn token_from_login(response: &LoginResponse) -> Result<String> {
    if response.body.trim() != endpoints::LOGIN_SUCCESS_BODY {
        return Err(AppError::Authentication(
            "SGE rejected the user or password".to_string(),
        ));
    }

    let prefix = format!("{}=", endpoints::SESSION_COOKIE);
    response
        .set_cookies
        .iter()
        .filter_map(|header| header.split(';').next())
        .filter_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty() && *value != "deleted")
        .last()
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Protocol(format!(
                "login succeeded but no {} cookie was set",
                endpoints::SESSION_COOKIE
            ))
        })
}

/// A registry of authenticated SGE sessions.
///
/// Cheap to clone; clones share the same cache. Construct one per process and
/// inject it where needed.
#[derive(Clone)]
pub struct SessionPool {
    inner: Arc<PoolInner>,
}

impl SessionPool {
    /// Creates a new, empty `SessionPool`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Used for the raw login call.
    /// * `config` - TTL and capacity.
    pub fn new(transport: Arc<dyn SgeTransport>, config: PoolConfig) -> Self {
        let mut digest_key = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut digest_key[..]);

        Self {
            inner: Arc::new(PoolInner {
                transport,
                config,
                digest_key,
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Returns a session token for these credentials, logging in only when needed.
    ///
    /// A live cached session opened with the same password is returned without
    /// network I/O. When a login with the same user and password is already
    /// running, this awaits that login instead of starting another one. Any other
    /// password goes to SGE, so a wrong one is rejected even while the user has a
    /// cached session.
    pub async fn get_session(&self, credentials: &Credentials) -> Result<String> {
        let user = normalize_user(&credentials.user)?;
        validate_password(&credentials.password)?;
        let digest = self.inner.digest(&credentials.password);

        let login = {
            let mut state = self.inner.lock();

            if let Some(token) = state.touch(&user, &digest, Instant::now()) {
                tracing::debug!("✅ SGE session cache hit for {}", mask_user(&user));
                return Ok(token);
            }

            let key = (user, digest);
            match state.pending.get(&key) {
                Some(pending) => {
                    tracing::debug!("⏳ Joining in-flight SGE login for {}", mask_user(&key.0));
                    pending.clone()
                }
                None => {
                    let pending =
                        self.start_login(key.clone(), Zeroizing::new(credentials.password.clone()));
                    state.pending.insert(key, pending.clone());
                    pending
                }
            }
        };

        login.await
    }

    /// Removes the cached session for a user, if any.
    ///
    /// Used when SGE reports a session as expired before the local TTL elapsed.
    pub fn invalidate_session(&self, user: &str) -> Result<bool> {
        let key = normalize_user(user)?;
        let removed = self.inner.lock().sessions.remove(&key).is_some();
        if removed {
            tracing::info!("🗑️  Invalidated SGE session for {}", mask_user(&key));
        }
        Ok(removed)
    }

    /// Drops every expired session. Lookups already ignore them; this only frees memory.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.inner.lock();
        let before = state.sessions.len();
        state.sessions.retain(|_, session| !session.is_expired(now));
        before - state.sessions.len()
    }

    /// Whether a live session is cached for this user.
    pub fn is_cached(&self, user: &str) -> bool {
        let Ok(key) = normalize_user(user) else {
            return false;
        };
        self.inner
            .lock()
            .sessions
            .get(&key)
            .is_some_and(|session| !session.is_expired(Instant::now()))
    }

    /// Number of cached sessions, expired ones not yet purged included.
    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Whether the pool holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pool's configuration.
    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }

    /// Spawns the login so it settles even if every waiting caller goes away.
    fn start_login(&self, pending_key: PendingKey, password: Zeroizing<String>) -> PendingLogin {
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let key = pending_key.0.clone();
            let guard = PendingGuard {
                inner: Arc::clone(&inner),
                key: pending_key,
                settled: false,
            };

            tracing::info!("🔐 Logging in to SGE as {}", mask_user(&key));

            let result = match inner.transport.login(&key, &password).await {
                Ok(response) => token_from_login(&response),
                Err(e) => Err(e),
            };

            guard.settle(result.as_deref().ok());

            match &result {
                Ok(_) => tracing::info!("✅ SGE session established for {}", mask_user(&key)),
                Err(e) => tracing::warn!("❌ SGE login failed for {}: {}", mask_user(&key), e),
            }

            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(AppError::Internal(format!("SGE login task failed: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: PasswordDigest = [1; 32];

    fn response(body: &str, cookies: &[&str]) -> LoginResponse {
        LoginResponse {
            body: body.to_string(),
            set_cookies: cookies.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn sentinel_and_cookie_yield_token() {
        let token = token_from_login(&response(
            "0",
            &["lang=pt; path=/", "PHPSESSID=abc123; path=/; HttpOnly"],
        ))
        .unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn other_bodies_are_authentication_errors() {
        for body in ["1", "Usuário ou senha inválidos", ""] {
            assert!(matches!(
                token_from_login(&response(body, &["PHPSESSID=abc"])),
                Err(AppError::Authentication(_))
            ));
        }
    }

    #[test]
    fn missing_cookie_is_a_protocol_error() {
        assert!(matches!(
            token_from_login(&response("0", &["lang=pt"])),
            Err(AppError::Protocol(_))
        ));
        assert!(matches!(
            token_from_login(&response("0", &["PHPSESSID=deleted; expires=Thu, 01 Jan 1970"])),
            Err(AppError::Protocol(_))
        ));
    }

    #[test]
    fn last_session_cookie_wins() {
        let token = token_from_login(&response(
            "0\n",
            &["PHPSESSID=first; path=/", "PHPSESSID=second; path=/"],
        ))
        .unwrap();
        assert_eq!(token, "second");
    }

    #[test]
    fn eviction_removes_the_oldest_last_used() {
        let config = PoolConfig {
            ttl: Duration::from_secs(60),
            max_sessions: 2,
        };
        let start = Instant::now();
        let mut state = PoolState::default();
        state.insert("1".into(), "t1".into(), DIGEST, start, &config);
        state.insert("2".into(), "t2".into(), DIGEST, start + Duration::from_secs(1), &config);
        state.touch("1", &DIGEST, start + Duration::from_secs(2));
        state.insert("3".into(), "t3".into(), DIGEST, start + Duration::from_secs(3), &config);

        assert!(state.sessions.contains_key("1"));
        assert!(!state.sessions.contains_key("2"));
        assert!(state.sessions.contains_key("3"));
    }

    #[test]
    fn touch_drops_expired_entries() {
        let config = PoolConfig {
            ttl: Duration::from_secs(10),
            max_sessions: 5,
        };
        let start = Instant::now();
        let mut state = PoolState::default();
        state.insert("1".into(), "t1".into(), DIGEST, start, &config);

        assert_eq!(state.touch("1", &DIGEST, start + Duration::from_secs(9)).as_deref(), Some("t1"));
        assert_eq!(state.touch("1", &DIGEST, start + Duration::from_secs(10)), None);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn touch_with_another_password_misses_and_keeps_the_session() {
        let config = PoolConfig {
            ttl: Duration::from_secs(10),
            max_sessions: 5,
        };
        let start = Instant::now();
        let mut state = PoolState::default();
        state.insert("1".into(), "t1".into(), DIGEST, start, &config);

        assert_eq!(state.touch("1", &[9; 32], start + Duration::from_secs(1)), None);
        assert_eq!(state.sessions["1"].last_used_at, start);
        assert_eq!(state.touch("1", &DIGEST, start + Duration::from_secs(2)).as_deref(), Some("t1"));
    }

    #[test]
    fn digests_are_keyed_per_pool() {
        struct NoTransport;

        #[async_trait::async_trait]
        impl SgeTransport for NoTransport {
            async fn login(&self, _user: &str, _password: &str) -> Result<LoginResponse> {
                Err(AppError::Internal("unused".to_string()))
            }

            async fn send(
                &self,
                _token: &str,
                _request: &crate::sge::transport::SgeRequest,
            ) -> Result<String> {
                Err(AppError::Internal("unused".to_string()))
            }
        }

        let a = SessionPool::new(Arc::new(NoTransport), PoolConfig::default());
        let b = SessionPool::new(Arc::new(NoTransport), PoolConfig::default());

        assert_eq!(a.inner.digest("s3nha"), a.inner.digest("s3nha"));
        assert_ne!(a.inner.digest("s3nha"), a.inner.digest("s3nhA"));
        assert_ne!(a.inner.digest("s3nha"), b.inner.digest("s3nha"));
    }
}
