use sonic_rs::Value;

use crate::error::{AppError, Result};
use crate::models::credentials::Credentials;
use crate::models::incident::{IncidentBuckets, IncidentDraft, IncidentRecord, IncidentStatus};
use crate::models::outcome::WriteOutcome;
use crate::parsers::incidents;
use crate::sge::client::SgeClient;
use crate::sge::endpoints;
use crate::sge::transport::SgeRequest;
use crate::validation::dates::to_legacy_date;
use crate::validation::diary::{require_id, validate_text};

/// Disciplinary incident records ("ocorrências").
///
/// Only the status primitive is exposed. Which transitions are allowed
/// (open to approved or cancelled, and back to open) is up to the caller.
#[derive(Clone)]
pub struct IncidentClient {
    sge: SgeClient,
}

impl IncidentClient {
    /// Creates a new `IncidentClient`.
    pub fn new(sge: SgeClient) -> Self {
        Self { sge }
    }

    /// Creates an incident (`id` absent or `0`) or updates an existing one.
    pub async fn save_incident(
        &self,
        credentials: &Credentials,
        draft: &IncidentDraft,
    ) -> Result<WriteOutcome> {
        let code = draft.id.unwrap_or(0);

        let request = SgeRequest::post(endpoints::incidents::SAVE)
            .field("codigo", code.to_string())
            .field("aluno", require_id("student_id", &draft.student_id)?)
            .field("turma", require_id("class_id", &draft.class_id)?)
            .field("data", to_legacy_date(&draft.date)?)
            .field("tipo", require_id("kind", &draft.kind)?)
            .field("descricao", validate_text("description", &draft.description)?);

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log(if code == 0 { "new incident" } else { "incident update" });
        Ok(outcome)
    }

    /// Fetches one incident.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when SGE has no record with that id.
    pub async fn fetch_incident(
        &self,
        credentials: &Credentials,
        incident_id: u64,
    ) -> Result<Option<IncidentRecord>> {
        if incident_id == 0 {
            return Err(AppError::Validation("incident_id must be positive".to_string()));
        }

        let request =
            SgeRequest::get(endpoints::incidents::GET).query("codigo", incident_id.to_string());
        let body = self.sge.request(credentials, &request).await?;
        incidents::parse_incident(&body)
    }

    /// Sets an incident's status.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The SGE credentials of the staff member.
    /// * `incident_id` - The incident.
    /// * `status` - Target status.
    /// * `reason` - Justification, sent when given.
    pub async fn set_incident_status(
        &self,
        credentials: &Credentials,
        incident_id: u64,
        status: IncidentStatus,
        reason: Option<&str>,
    ) -> Result<WriteOutcome> {
        if incident_id == 0 {
            return Err(AppError::Validation("incident_id must be positive".to_string()));
        }

        let mut request = SgeRequest::post(endpoints::incidents::SET_STATUS)
            .field("codigo", incident_id.to_string())
            .field("situacao", status.legacy_code());

        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            request = request.field("motivo", validate_text("reason", reason)?);
        }

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("incident status change");
        Ok(outcome)
    }

    /// Fetches every incident visible to the user, split by status.
    pub async fn fetch_incidents(&self, credentials: &Credentials) -> Result<IncidentBuckets> {
        let value: Value = self
            .sge
            .request_json(credentials, &SgeRequest::get(endpoints::incidents::LIST))
            .await?;
        let buckets = incidents::incidents_from_json(&value)?;

        tracing::debug!(
            "📋 Incidents: {} open, {} approved, {} cancelled",
            buckets.open.len(),
            buckets.approved.len(),
            buckets.cancelled.len()
        );
        Ok(buckets)
    }
}
