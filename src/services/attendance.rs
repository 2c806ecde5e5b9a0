use sonic_rs::Value;

use crate::error::Result;
use crate::models::attendance::{
    AttendanceDay, AttendanceDetail, AttendanceSubmission, ClassOption, RosterEntry,
    SubjectOption,
};
use crate::models::credentials::Credentials;
use crate::models::outcome::WriteOutcome;
use crate::parsers::{attendance_table, json, select};
use crate::sge::client::SgeClient;
use crate::sge::endpoints::diary;
use crate::sge::transport::SgeRequest;
use crate::validation::dates::to_legacy_date;
use crate::validation::diary::{require_id, validate_period};

/// Attendance operations of the class diary.
#[derive(Clone)]
pub struct AttendanceClient {
    sge: SgeClient,
}

impl AttendanceClient {
    /// Creates a new `AttendanceClient`.
    pub fn new(sge: SgeClient) -> Self {
        Self { sge }
    }

    /// Lists the classes the user teaches, scraped from the attendance page dropdown.
    pub async fn fetch_classes(&self, credentials: &Credentials) -> Result<Vec<ClassOption>> {
        let html = self
            .sge
            .request(credentials, &SgeRequest::get(diary::ATTENDANCE_PAGE))
            .await?;
        select::parse_select_options(&html, diary::CLASS_SELECT_ID)
    }

    /// Lists the subjects of a class.
    ///
    /// A response that is not JSON yields an empty list, not an error.
    pub async fn fetch_subjects(
        &self,
        credentials: &Credentials,
        class_id: &str,
    ) -> Result<Vec<SubjectOption>> {
        let request = SgeRequest::get(diary::SUBJECTS).query("turma", require_id("class_id", class_id)?);
        let body = self.sge.request(credentials, &request).await?;
        Ok(json::parse_subjects(&body))
    }

    /// Fetches the roster of a class.
    pub async fn fetch_roster(
        &self,
        credentials: &Credentials,
        class_id: &str,
    ) -> Result<Vec<RosterEntry>> {
        let request = SgeRequest::get(diary::ROSTER).query("turma", require_id("class_id", class_id)?);
        let value: Value = self.sge.request_json(credentials, &request).await?;
        json::roster_from_json(&value)
    }

    /// Records attendance for one class period.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The user's SGE credentials.
    /// * `submission` - Class, subject, period, ISO date and the students present.
    ///
    /// # Returns
    ///
    /// SGE's verdict. A rejected write is a `WriteOutcome` with `success: false`,
    /// not an error.
    pub async fn submit_attendance(
        &self,
        credentials: &Credentials,
        submission: &AttendanceSubmission,
    ) -> Result<WriteOutcome> {
        validate_period(submission.period)?;

        let present = submission
            .present_student_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let request = SgeRequest::post(diary::ATTENDANCE_SAVE)
            .field("turma", require_id("class_id", &submission.class_id)?)
            .field("disciplina", require_id("subject_id", &submission.subject_id)?)
            .field("aula", submission.period.to_string())
            .field("data", to_legacy_date(&submission.date)?)
            .field("presentes", present);

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("attendance submission");
        Ok(outcome)
    }

    /// Changes one student's presence, addressed by the record id from the detail view.
    pub async fn edit_presence(
        &self,
        credentials: &Credentials,
        record_id: &str,
        present: bool,
    ) -> Result<WriteOutcome> {
        let request = SgeRequest::post(diary::ATTENDANCE_EDIT)
            .field("codigo", require_id("record_id", record_id)?)
            .field("presente", if present { "1" } else { "0" });

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("presence edit");
        Ok(outcome)
    }

    /// Deletes every attendance record of a class and subject on one day.
    pub async fn delete_attendance(
        &self,
        credentials: &Credentials,
        day: &AttendanceDay,
    ) -> Result<WriteOutcome> {
        let request = SgeRequest::post(diary::ATTENDANCE_DELETE)
            .field("turma", require_id("class_id", &day.class_id)?)
            .field("disciplina", require_id("subject_id", &day.subject_id)?)
            .field("data", to_legacy_date(&day.date)?);

        let outcome = WriteOutcome::from_body(&self.sge.request(credentials, &request).await?);
        outcome.log("attendance deletion");
        Ok(outcome)
    }

    /// Fetches per-student presence for one day, with the record ids needed for edits.
    pub async fn fetch_attendance_detail(
        &self,
        credentials: &Credentials,
        day: &AttendanceDay,
    ) -> Result<Vec<AttendanceDetail>> {
        let request = SgeRequest::get(diary::ATTENDANCE_DETAIL)
            .query("turma", require_id("class_id", &day.class_id)?)
            .query("disciplina", require_id("subject_id", &day.subject_id)?)
            .query("data", to_legacy_date(&day.date)?);

        let html = self.sge.request(credentials, &request).await?;
        attendance_table::parse_attendance_detail(&html)
    }
}

