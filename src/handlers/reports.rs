use axum::{
    extract::{Query, State},
    response::Html,
    Extension,
};

use crate::{
    error::Result,
    models::{
        credentials::Credentials,
        report::{DailyReportParams, MonthlyReportParams, ReportParams},
    },
    state::AppState,
};

/// Daily attendance report as SGE renders it.
pub async fn daily_report(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(params): Query<DailyReportParams>,
) -> Result<Html<String>> {
    Ok(Html(state.reports.daily_report(&credentials, &params).await?))
}

/// Monthly attendance report as SGE renders it.
pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(params): Query<MonthlyReportParams>,
) -> Result<Html<String>> {
    Ok(Html(state.reports.monthly_report(&credentials, &params).await?))
}

/// Any other report, sanitized for embedding.
pub async fn proxy_report(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(params): Query<ReportParams>,
) -> Result<Html<String>> {
    tracing::debug!("📊 Proxying {:?} report for class {}", params.kind, params.class_id);
    Ok(Html(state.reports.proxy_report(&credentials, &params).await?))
}
