use crate::error::Result;
use crate::models::content::{ContentDraft, ContentEntry, ContentQuery, ContentUpdate};
use crate::models::credentials::Credentials;
use crate::models::outcome::WriteOutcome;
use crate::parsers::content_table;
use crate::sge::client::SgeClient;
use crate::sge::endpoints::diary;
use crate::sge::transport::SgeRequest;
use crate::validation::dates::to_legacy_date;
use crate::validation::diary::{require_id, validate_period, validate_text};

/// Lesson content ("conteúdo ministrado") entries of the class diary.
#[derive(Clone)]
pub struct ContentClient {
    sge: SgeClient,
}

impl ContentClient {
    /// Creates a new `ContentClient`.
    pub fn new(sge: SgeClient) -> Self {
        Self { sge }
    }

    /// Records what was taught in one class period.
    pub async fn create_content(
        &self,
        credentials: &Credentials,
        draft: &ContentDraft,
    ) -> Result<WriteOutcome> {
        validate_period(draft.period)?;

        let request = SgeRequest::post(diary::CONTENT_SAVE)
            .field("turma", require_id("class_id", &draft.class_id)?)
            .field("disciplina", require_id("subject_id", &draft.subject_id)?)
            .field("aula", draft.period.to_string())
            .field("data", to_legacy_date(&draft.date)?)
            .field("conteudo", validate_text("text", &draft.text)?);

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("content entry");
        Ok(outcome)
    }

    /// Lists content entries of a class and subject, optionally for one date.
    pub async fn fetch_contents(
        &self,
        credentials: &Credentials,
        query: &ContentQuery,
    ) -> Result<Vec<ContentEntry>> {
        let mut request = SgeRequest::get(diary::CONTENT_LIST)
            .query("turma", require_id("class_id", &query.class_id)?)
            .query("disciplina", require_id("subject_id", &query.subject_id)?);

        if let Some(date) = query.date.as_deref().filter(|d| !d.trim().is_empty()) {
            request = request.query("data", to_legacy_date(date)?);
        }

        let html = self.sge.request(credentials, &request).await?;
        content_table::parse_content_entries(&html)
    }

    /// Rewrites a content entry identified by the id from `fetch_contents`.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The user's SGE credentials.
    /// * `content_id` - The entry's opaque identifier.
    /// * `update` - New text and, optionally, a new period or date.
    pub async fn edit_content(
        &self,
        credentials: &Credentials,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<WriteOutcome> {
        let mut request = SgeRequest::post(diary::CONTENT_EDIT)
            .field("codigo", require_id("content_id", content_id)?)
            .field("conteudo", validate_text("text", &update.text)?);

        if let Some(period) = update.period {
            validate_period(period)?;
            request = request.field("aula", period.to_string());
        }
        if let Some(date) = update.date.as_deref() {
            request = request.field("data", to_legacy_date(date)?);
        }

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("content edit");
        Ok(outcome)
    }

    /// Deletes a content entry.
    pub async fn delete_content(
        &self,
        credentials: &Credentials,
        content_id: &str,
    ) -> Result<WriteOutcome> {
        let request = SgeRequest::post(diary::CONTENT_DELETE)
            .field("codigo", require_id("content_id", content_id)?);

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("content deletion");
        Ok(outcome)
    }
}
