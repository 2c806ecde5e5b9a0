use serde::{Deserialize, Serialize};

/// An entry of the class/section dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassOption {
    /// The legacy class identifier (the `<option>` value).
    pub id: String,
    /// The label shown by SGE, e.g. `7º ANO A - MATUTINO`.
    pub label: String,
}

/// A subject taught to a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectOption {
    /// The legacy subject identifier.
    pub id: String,
    /// The subject name.
    pub name: String,
}

/// A student on a class roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    /// The legacy student identifier.
    pub student_id: String,
    /// The student's name.
    pub name: String,
    /// Position on the call list, when SGE provides it.
    pub call_number: Option<u32>,
    /// Enrollment status text (e.g. `MATRICULADO`, `TRANSFERIDO`).
    pub status: Option<String>,
}

/// Attendance for one class period.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSubmission {
    /// The class identifier.
    pub class_id: String,
    /// The subject identifier.
    pub subject_id: String,
    /// The lesson period (1-based).
    pub period: u32,
    /// ISO date of the lesson.
    pub date: String,
    /// Students marked present; everyone else on the roster is absent.
    pub present_student_ids: Vec<u64>,
}

/// Selects one day of attendance for a class and subject.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceDay {
    /// The class identifier.
    pub class_id: String,
    /// The subject identifier.
    pub subject_id: String,
    /// ISO date.
    pub date: String,
}

/// One row of the per-student attendance detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceDetail {
    /// The legacy student identifier, when the row carries one.
    pub student_id: Option<String>,
    /// The student's name.
    pub student_name: String,
    /// Whether the student is marked present.
    pub present: bool,
    /// Opaque per-record identifier used to edit this presence later.
    pub record_id: String,
}

/// A change to one student's presence.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceUpdate {
    /// Whether the student is present.
    pub present: bool,
}
