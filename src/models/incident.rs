use serde::{Deserialize, Serialize};

/// Lifecycle status of an incident record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Awaiting review.
    Open,
    /// Approved by the school management.
    Approved,
    /// Cancelled.
    Cancelled,
}

impl IncidentStatus {
    /// The status code SGE stores.
    pub fn legacy_code(self) -> &'static str {
        match self {
            IncidentStatus::Open => "P",
            IncidentStatus::Approved => "A",
            IncidentStatus::Cancelled => "C",
        }
    }

    /// Parses the status code SGE stores.
    pub fn from_legacy_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "P" | "" => Some(IncidentStatus::Open),
            "A" => Some(IncidentStatus::Approved),
            "C" => Some(IncidentStatus::Cancelled),
            _ => None,
        }
    }
}

/// Who changed an incident's status, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Name of the staff member.
    pub by: String,
    /// ISO date, when SGE's date parses.
    pub at: Option<String>,
    /// Free-text justification (cancellations only).
    pub reason: Option<String>,
}

/// An incident record as read from SGE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentRecord {
    /// The legacy identifier.
    pub id: u64,
    /// The student the incident concerns.
    pub student_id: String,
    /// The student's name.
    pub student_name: Option<String>,
    /// The class identifier.
    pub class_id: Option<String>,
    /// ISO date of the incident.
    pub date: Option<String>,
    /// Incident category as labelled by SGE.
    pub kind: Option<String>,
    /// Free-text description.
    pub description: String,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Approval metadata.
    pub approval: Option<StatusChange>,
    /// Cancellation metadata.
    pub cancellation: Option<StatusChange>,
}

/// A new or updated incident record.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentDraft {
    /// `None` or `0` creates a record; a positive id updates that record.
    #[serde(default)]
    pub id: Option<u64>,
    /// The student the incident concerns.
    pub student_id: String,
    /// The class identifier.
    pub class_id: String,
    /// ISO date of the incident.
    pub date: String,
    /// Incident category code.
    pub kind: String,
    /// Free-text description.
    pub description: String,
}

/// Every incident record partitioned by lifecycle status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncidentBuckets {
    /// Awaiting review.
    pub open: Vec<IncidentRecord>,
    /// Approved.
    pub approved: Vec<IncidentRecord>,
    /// Cancelled.
    pub cancelled: Vec<IncidentRecord>,
}

impl IncidentBuckets {
    /// Places a record in the bucket matching its status.
    pub fn push(&mut self, record: IncidentRecord) {
        match record.status {
            IncidentStatus::Open => self.open.push(record),
            IncidentStatus::Approved => self.approved.push(record),
            IncidentStatus::Cancelled => self.cancelled.push(record),
        }
    }

    /// Total number of records across all buckets.
    pub fn len(&self) -> usize {
        self.open.len() + self.approved.len() + self.cancelled.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A status change requested for an incident.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// The target status.
    pub status: IncidentStatus,
    /// Justification, sent along with cancellations.
    #[serde(default)]
    pub reason: Option<String>,
}
