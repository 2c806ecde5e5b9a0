use std::sync::Arc;

use crate::config::Config;
use crate::crypto::cipher::CredentialCipher;
use crate::error::Result;
use crate::middleware_layer::rate_limit::LoginAttempts;
use crate::services::{
    attendance::AttendanceClient, content::ContentClient, incidents::IncidentClient,
    reports::ReportClient,
};
use crate::sge::client::SgeClient;
use crate::sge::session_pool::{PoolConfig, SessionPool};
use crate::sge::transport::{HttpTransport, SgeTransport};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Seals the credential cookie.
    pub cipher: Arc<CredentialCipher>,
    /// Authenticated access to SGE, sharing one session pool.
    pub sge: SgeClient,
    /// Attendance domain client.
    pub attendance: AttendanceClient,
    /// Lesson content domain client.
    pub content: ContentClient,
    /// Incident domain client.
    pub incidents: IncidentClient,
    /// Report domain client.
    pub reports: ReportClient,
    /// Failed login counters.
    pub login_attempts: LoginAttempts,
}

impl AppState {
    /// Creates a new `AppState` talking to SGE over HTTP.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.sge_base_url, config.request_timeout)?;
        tracing::info!(
            "✅ SGE HTTP transport initialized (timeout {}s)",
            config.request_timeout.as_secs()
        );

        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a new `AppState` over any transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn SgeTransport>) -> Result<Self> {
        let cipher = Arc::new(CredentialCipher::new(&config.credential_secret)?);
        tracing::info!("✅ Credential cipher initialized");

        let pool = SessionPool::new(
            Arc::clone(&transport),
            PoolConfig {
                ttl: config.session_ttl,
                max_sessions: config.max_sessions,
            },
        );
        tracing::info!(
            "✅ SGE session pool initialized (ttl {}s, max {} sessions)",
            config.session_ttl.as_secs(),
            config.max_sessions
        );

        let sge = SgeClient::new(pool, transport);

        Ok(AppState {
            config: config.clone(),
            cipher,
            attendance: AttendanceClient::new(sge.clone()),
            content: ContentClient::new(sge.clone()),
            incidents: IncidentClient::new(sge.clone()),
            reports: ReportClient::new(sge.clone()),
            sge,
            login_attempts: LoginAttempts::new(),
        })
    }
}
