use crate::error::Result;
use crate::models::credentials::Credentials;
use crate::models::report::{DailyReportParams, MonthlyReportParams, ReportParams};
use crate::parsers::sanitize::sanitize_report;
use crate::sge::client::SgeClient;

/// Statistical reports rendered by SGE.
#[derive(Clone)]
pub struct ReportClient {
    sge: SgeClient,
}

impl ReportClient {
    /// Creates a new `ReportClient`.
    pub fn new(sge: SgeClient) -> Self {
        Self { sge }
    }

    /// Daily attendance report, raw HTML for client-side rendering.
    pub async fn daily_report(
        &self,
        credentials: &Credentials,
        params: &DailyReportParams,
    ) -> Result<String> {
        self.sge.request(credentials, &params.to_request()?).await
    }

    /// Monthly attendance report, raw HTML for client-side rendering.
    pub async fn monthly_report(
        &self,
        credentials: &Credentials,
        params: &MonthlyReportParams,
    ) -> Result<String> {
        self.sge.request(credentials, &params.to_request()?).await
    }

    /// Any other report, with scripts, inline handlers and relative references removed
    /// so the page can be embedded without running legacy code.
    pub async fn proxy_report(
        &self,
        credentials: &Credentials,
        params: &ReportParams,
    ) -> Result<String> {
        let html = self.sge.request(credentials, &params.to_request()?).await?;
        Ok(sanitize_report(&html))
    }
}
