use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::header::{COOKIE, SET_COOKIE};

use crate::error::{AppError, Result};
use crate::sge::endpoints;

/// One request to a legacy SGE script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgeRequest {
    /// HTTP method.
    pub method: Method,
    /// Script path, relative to the SGE base URL.
    pub path: String,
    /// Query-string parameters.
    pub query: Vec<(String, String)>,
    /// Form-encoded body, when the script expects one.
    pub form: Option<Vec<(String, String)>>,
}

impl SgeRequest {
    /// A `GET` request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            form: None,
        }
    }

    /// A form-encoded `POST` request for `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            form: Some(Vec::new()),
        }
    }

    /// Adds a query-string parameter.
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Adds a form field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(Vec::new)
            .push((key.to_string(), value.into()));
        self
    }

    /// Looks up a query-string parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a form field.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The raw answer of the login script, before the session pool interprets it.
#[derive(Debug, Clone, Default)]
pub struct LoginResponse {
    /// Response body (`"0"` on success).
    pub body: String,
    /// Every `Set-Cookie` header value.
    pub set_cookies: Vec<String>,
}

/// How the bridge talks to SGE.
///
/// The session pool owns the meaning of a login; the transport only moves bytes.
#[async_trait]
pub trait SgeTransport: Send + Sync {
    /// Posts credentials to the login script.
    async fn login(&self, user: &str, password: &str) -> Result<LoginResponse>;

    /// Sends one request carrying the session token, returning the raw body.
    async fn send(&self, token: &str, request: &SgeRequest) -> Result<String>;
}

/// `SgeTransport` over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a new `HttpTransport`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of the SGE installation.
    /// * `timeout` - Deadline applied to every request, login included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SgeTransport for HttpTransport {
    async fn login(&self, user: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .client
            .post(self.url(endpoints::LOGIN))
            .form(&[("user", user), ("user_password", password)])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AppError::Protocol(format!("login answered HTTP {}", status)));
        }

        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = response.text().await?;

        Ok(LoginResponse { body, set_cookies })
    }

    async fn send(&self, token: &str, request: &SgeRequest) -> Result<String> {
        tracing::debug!("➡️  SGE {} {}", request.method, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .header(COOKIE, format!("{}={}", endpoints::SESSION_COOKIE, token));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_server_error() || status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Protocol(format!(
                "{} answered HTTP {}",
                request.path, status
            )));
        }

        let body = response.text().await?;
        tracing::debug!("⬅️  SGE {} -> {} ({} bytes)", request.path, status, body.len());

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_fields_and_query() {
        let request = SgeRequest::post("/x.php")
            .field("turma", "1203")
            .field("data", "10/03/2026")
            .query("acao", "salvar");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.form_value("turma"), Some("1203"));
        assert_eq!(request.form_value("data"), Some("10/03/2026"));
        assert_eq!(request.query_value("acao"), Some("salvar"));
        assert_eq!(request.form_value("missing"), None);
    }

    #[test]
    fn get_has_no_body() {
        let request = SgeRequest::get("/y.php").query("turma", "1");
        assert!(request.form.is_none());
        assert_eq!(request.query_value("turma"), Some("1"));
    }
}
