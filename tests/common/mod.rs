#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sge_bridge::error::Result;
use sge_bridge::models::credentials::Credentials;
use sge_bridge::sge::client::SgeClient;
use sge_bridge::sge::session_pool::{PoolConfig, SessionPool};
use sge_bridge::sge::transport::{LoginResponse, SgeRequest, SgeTransport};

/// Password the fake SGE rejects.
pub const WRONG_PASSWORD: &str = "wrong";

/// What SGE's login redirect looks like.
pub const EXPIRED_PAGE: &str =
    "<script type=\"text/javascript\">window.location = 'index.php';</script>";

type Responder = Box<dyn Fn(&SgeRequest) -> String + Send + Sync>;

/// An in-memory SGE: counts logins, records every request, answers from a script.
pub struct MockTransport {
    logins: AtomicUsize,
    login_delay: Duration,
    sent: Mutex<Vec<(String, SgeRequest)>>,
    scripted: Mutex<VecDeque<String>>,
    responder: Responder,
}

impl MockTransport {
    /// Answers `"0"` to everything not scripted.
    pub fn new() -> Self {
        Self::with_responder(|_| "0".to_string())
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&SgeRequest) -> String + Send + Sync + 'static,
    {
        Self {
            logins: AtomicUsize::new(0),
            login_delay: Duration::ZERO,
            sent: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
        }
    }

    pub fn login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Queues bodies returned, in order, before the responder is consulted.
    pub fn script<I, S>(self, bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripted
            .lock()
            .unwrap()
            .extend(bodies.into_iter().map(Into::into));
        self
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, SgeRequest)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> SgeRequest {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, request)| request.clone())
            .expect("no request was sent")
    }
}

#[async_trait]
impl SgeTransport for MockTransport {
    async fn login(&self, _user: &str, password: &str) -> Result<LoginResponse> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }

        if password == WRONG_PASSWORD {
            return Ok(LoginResponse {
                body: "1".to_string(),
                set_cookies: Vec::new(),
            });
        }

        Ok(LoginResponse {
            body: "0".to_string(),
            set_cookies: vec![format!("PHPSESSID=tok-{}; path=/; HttpOnly", n)],
        })
    }

    async fn send(&self, token: &str, request: &SgeRequest) -> Result<String> {
        self.sent
            .lock()
            .unwrap()
            .push((token.to_string(), request.clone()));

        if let Some(body) = self.scripted.lock().unwrap().pop_front() {
            return Ok(body);
        }
        Ok((self.responder)(request))
    }
}

pub fn pool_config(ttl_secs: u64, max_sessions: usize) -> PoolConfig {
    PoolConfig {
        ttl: Duration::from_secs(ttl_secs),
        max_sessions,
    }
}

pub fn pool(transport: &Arc<MockTransport>, config: PoolConfig) -> SessionPool {
    SessionPool::new(transport.clone(), config)
}

pub fn client(transport: &Arc<MockTransport>) -> SgeClient {
    let pool = SessionPool::new(transport.clone(), PoolConfig::default());
    SgeClient::new(pool, transport.clone())
}

pub fn staff() -> Credentials {
    Credentials::new("111.222.333-44", "s3nha")
}
