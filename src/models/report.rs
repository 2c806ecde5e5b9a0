use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::sge::endpoints::reports;
use crate::sge::transport::SgeRequest;
use crate::validation::dates::{to_legacy_date, validate_month};
use crate::validation::diary::require_id;

/// Reports served through the sanitizing proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Class diary.
    ClassDiary,
    /// Content taught over a date range.
    ContentSummary,
    /// Absences over a date range.
    AbsenceSummary,
    /// One student's attendance history.
    StudentAttendance,
    /// Incidents over a date range.
    IncidentSummary,
}

impl ReportKind {
    /// The legacy script rendering this report.
    pub fn path(self) -> &'static str {
        match self {
            ReportKind::ClassDiary => reports::CLASS_DIARY,
            ReportKind::ContentSummary => reports::CONTENT_SUMMARY,
            ReportKind::AbsenceSummary => reports::ABSENCE_SUMMARY,
            ReportKind::StudentAttendance => reports::STUDENT_ATTENDANCE,
            ReportKind::IncidentSummary => reports::INCIDENT_SUMMARY,
        }
    }
}

/// Parameters of a daily attendance report.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyReportParams {
    /// The class identifier.
    pub class_id: String,
    /// ISO date.
    pub date: String,
}

impl DailyReportParams {
    /// Builds the legacy request.
    pub fn to_request(&self) -> Result<SgeRequest> {
        Ok(SgeRequest::get(reports::DAILY)
            .query("turma", require_id("class_id", &self.class_id)?)
            .query("data", to_legacy_date(&self.date)?))
    }
}

/// Parameters of a monthly attendance report.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyReportParams {
    /// The class identifier.
    pub class_id: String,
    /// Restricts the report to one subject.
    #[serde(default)]
    pub subject_id: Option<String>,
    /// Month, 1 to 12.
    pub month: u32,
    /// Four-digit year.
    pub year: i32,
}

impl MonthlyReportParams {
    /// Builds the legacy request.
    pub fn to_request(&self) -> Result<SgeRequest> {
        validate_month(self.month, self.year)?;

        let mut request = SgeRequest::get(reports::MONTHLY)
            .query("turma", require_id("class_id", &self.class_id)?)
            .query("mes", format!("{:02}", self.month))
            .query("ano", self.year.to_string());

        if let Some(subject) = self.subject_id.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.query("disciplina", subject.trim());
        }
        Ok(request)
    }
}

/// Parameters of a proxied report.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportParams {
    /// Which report.
    pub kind: ReportKind,
    /// The class identifier.
    pub class_id: String,
    /// Restricts the report to one subject.
    #[serde(default)]
    pub subject_id: Option<String>,
    /// The student, required by `student_attendance`.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Start of the range, ISO.
    #[serde(default)]
    pub from: Option<String>,
    /// End of the range, ISO.
    #[serde(default)]
    pub to: Option<String>,
}

impl ReportParams {
    /// Builds the legacy request, converting dates to `DD/MM/YYYY`.
    ///
    /// # Returns
    ///
    /// The request, or `AppError::Validation` for a bad date, a reversed range or a
    /// student report without a student.
    pub fn to_request(&self) -> Result<SgeRequest> {
        let mut request =
            SgeRequest::get(self.kind.path()).query("turma", require_id("class_id", &self.class_id)?);

        if let Some(subject) = non_blank(&self.subject_id) {
            request = request.query("disciplina", subject);
        }

        match non_blank(&self.student_id) {
            Some(student) => request = request.query("aluno", student),
            None if self.kind == ReportKind::StudentAttendance => {
                return Err(AppError::Validation(
                    "student_id is required for this report".to_string(),
                ));
            }
            None => {}
        }

        if let (Some(from), Some(to)) = (non_blank(&self.from), non_blank(&self.to)) {
            // ISO dates order lexicographically.
            if to_legacy_date(from).is_ok() && to_legacy_date(to).is_ok() && from > to {
                return Err(AppError::Validation(
                    "Report range starts after it ends".to_string(),
                ));
            }
        }

        if let Some(from) = non_blank(&self.from) {
            request = request.query("data_inicio", to_legacy_date(from)?);
        }
        if let Some(to) = non_blank(&self.to) {
            request = request.query("data_fim", to_legacy_date(to)?);
        }

        Ok(request)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(kind: ReportKind) -> ReportParams {
        ReportParams {
            kind,
            class_id: "1203".into(),
            subject_id: None,
            student_id: None,
            from: Some("2026-03-01".into()),
            to: Some("2026-03-31".into()),
        }
    }

    #[test]
    fn builds_legacy_query() {
        let request = params(ReportKind::AbsenceSummary).to_request().unwrap();
        assert_eq!(request.path, reports::ABSENCE_SUMMARY);
        assert_eq!(request.query_value("turma"), Some("1203"));
        assert_eq!(request.query_value("data_inicio"), Some("01/03/2026"));
        assert_eq!(request.query_value("data_fim"), Some("31/03/2026"));
        assert_eq!(request.query_value("aluno"), None);
    }

    #[test]
    fn student_report_needs_a_student() {
        assert!(matches!(
            params(ReportKind::StudentAttendance).to_request(),
            Err(AppError::Validation(_))
        ));

        let mut with_student = params(ReportKind::StudentAttendance);
        with_student.student_id = Some("501".into());
        assert_eq!(
            with_student.to_request().unwrap().query_value("aluno"),
            Some("501")
        );
    }

    #[test]
    fn rejects_reversed_ranges_and_bad_dates() {
        let mut reversed = params(ReportKind::ContentSummary);
        reversed.from = Some("2026-04-01".into());
        assert!(reversed.to_request().is_err());

        let mut bad = params(ReportKind::ContentSummary);
        bad.to = Some("31/03/2026".into());
        assert!(bad.to_request().is_err());
    }

    #[test]
    fn monthly_pads_month() {
        let request = MonthlyReportParams {
            class_id: "1203".into(),
            subject_id: Some("31".into()),
            month: 3,
            year: 2026,
        }
        .to_request()
        .unwrap();
        assert_eq!(request.query_value("mes"), Some("03"));
        assert_eq!(request.query_value("disciplina"), Some("31"));

        let daily = DailyReportParams {
            class_id: "1203".into(),
            date: "2026-03-10".into(),
        }
        .to_request()
        .unwrap();
        assert_eq!(daily.query_value("data"), Some("10/03/2026"));
    }
}
