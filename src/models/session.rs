use subtle::ConstantTimeEq;
use tokio::time::Instant;

/// A keyed digest of the password a session was opened with.
pub type PasswordDigest = [u8; 32];

/// A pooled SGE session for one normalized user.
///
/// `token` is the `PHPSESSID` value. `Debug` is not derived so it never ends up in logs.
#[derive(Clone)]
pub struct CachedSession {
    /// The session cookie value.
    pub token: String,
    /// Digest of the password that opened the session.
    pub password_digest: PasswordDigest,
    /// When the pool stops handing this session out.
    pub expires_at: Instant,
    /// Last cache hit, used for LRU eviction.
    pub last_used_at: Instant,
}

impl CachedSession {
    /// Creates a session that was just obtained.
    pub fn new(
        token: String,
        password_digest: PasswordDigest,
        now: Instant,
        ttl: std::time::Duration,
    ) -> Self {
        Self {
            token,
            password_digest,
            expires_at: now + ttl,
            last_used_at: now,
        }
    }

    /// Whether the session must no longer be returned.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Constant-time check that `digest` belongs to the password of this session.
    pub fn opened_with(&self, digest: &PasswordDigest) -> bool {
        self.password_digest.ct_eq(digest).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn only_the_opening_digest_matches() {
        let session = CachedSession::new("t".into(), [7; 32], Instant::now(), Duration::from_secs(1));
        assert!(session.opened_with(&[7; 32]));

        let mut other = [7; 32];
        other[31] = 8;
        assert!(!session.opened_with(&other));
    }
}
