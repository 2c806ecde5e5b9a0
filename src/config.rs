use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Secret used to derive the credential key when none is configured outside production.
const DEVELOPMENT_CREDENTIAL_SECRET: &str = "sge-bridge-development-secret-do-not-use-in-production";

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the legacy SGE installation (scheme and host, no trailing slash).
    pub sge_base_url: String,
    /// Secret the credential encryption key is derived from.
    pub credential_secret: Zeroizing<String>,
    /// Whether `APP_ENV` is `production`.
    pub is_production: bool,
    /// Local lifetime of a pooled SGE session.
    pub session_ttl: Duration,
    /// Maximum number of pooled SGE sessions.
    pub max_sessions: usize,
    /// Deadline for every outbound call to SGE.
    pub request_timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Origin allowed by CORS.
    pub cors_origin: String,
    /// Lifetime of the encrypted credential cookie in hours.
    pub credential_cookie_hours: i64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value for a configuration key, if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_production = lookup("APP_ENV")
            .unwrap_or_else(|| "development".to_string())
            == "production";

        let credential_secret = match lookup("SGE_CREDENTIAL_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => Zeroizing::new(secret),
            None if is_production => {
                anyhow::bail!("SGE_CREDENTIAL_SECRET must be set in production")
            }
            None => {
                tracing::warn!("⚠️  SGE_CREDENTIAL_SECRET not set, using the development default");
                Zeroizing::new(DEVELOPMENT_CREDENTIAL_SECRET.to_string())
            }
        };

        let sge_base_url = lookup("SGE_BASE_URL")
            .context("SGE_BASE_URL must be set (e.g. https://sge.example.edu.br)")?
            .trim_end_matches('/')
            .to_string();

        let session_ttl_secs: u64 = lookup("SGE_SESSION_TTL_SECS")
            .unwrap_or_else(|| "900".to_string())
            .parse()
            .context("Invalid SGE_SESSION_TTL_SECS")?;

        let max_sessions: usize = lookup("SGE_MAX_SESSIONS")
            .unwrap_or_else(|| "200".to_string())
            .parse()
            .context("Invalid SGE_MAX_SESSIONS")?;

        if max_sessions == 0 {
            anyhow::bail!("SGE_MAX_SESSIONS must be at least 1");
        }

        let request_timeout_secs: u64 = lookup("SGE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "20".to_string())
            .parse()
            .context("Invalid SGE_REQUEST_TIMEOUT_SECS")?;

        if request_timeout_secs == 0 {
            anyhow::bail!("SGE_REQUEST_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            sge_base_url,
            credential_secret,
            is_production,
            session_ttl: Duration::from_secs(session_ttl_secs),
            max_sessions,
            request_timeout: Duration::from_secs(request_timeout_secs),
            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            credential_cookie_hours: lookup("CREDENTIAL_COOKIE_HOURS")
                .unwrap_or_else(|| "12".to_string())
                .parse()
                .context("Invalid CREDENTIAL_COOKIE_HOURS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_outside_production() {
        let config = Config::from_lookup(lookup_from(&[("SGE_BASE_URL", "https://sge.test/")])).unwrap();
        assert_eq!(config.sge_base_url, "https://sge.test");
        assert_eq!(config.session_ttl, Duration::from_secs(900));
        assert_eq!(config.max_sessions, 200);
        assert!(!config.is_production);
        assert_eq!(config.credential_secret.as_str(), DEVELOPMENT_CREDENTIAL_SECRET);
    }

    #[test]
    fn production_requires_a_secret() {
        let result = Config::from_lookup(lookup_from(&[
            ("SGE_BASE_URL", "https://sge.test"),
            ("APP_ENV", "production"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn configured_secret_wins() {
        let config = Config::from_lookup(lookup_from(&[
            ("SGE_BASE_URL", "https://sge.test"),
            ("APP_ENV", "production"),
            ("SGE_CREDENTIAL_SECRET", "s3cr3t"),
        ]))
        .unwrap();
        assert!(config.is_production);
        assert_eq!(config.credential_secret.as_str(), "s3cr3t");
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("SGE_BASE_URL", "https://sge.test"),
            ("SGE_REQUEST_TIMEOUT_SECS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn base_url_is_required() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }
}
