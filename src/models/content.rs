use serde::{Deserialize, Serialize};

/// A new lesson content entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentDraft {
    /// The class identifier.
    pub class_id: String,
    /// The subject identifier.
    pub subject_id: String,
    /// The lesson period (1-based).
    pub period: u32,
    /// ISO date of the lesson.
    pub date: String,
    /// What was taught.
    pub text: String,
}

/// A lesson content entry as listed by SGE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEntry {
    /// Opaque identifier taken from the row's edit handler.
    pub id: String,
    /// ISO date, when the row's date cell parses.
    pub date: Option<String>,
    /// The lesson period, when the row's period cell parses.
    pub period: Option<u32>,
    /// The content text.
    pub text: String,
}

/// Selects the content entries of a class and subject.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentQuery {
    /// The class identifier.
    pub class_id: String,
    /// The subject identifier.
    pub subject_id: String,
    /// Restricts the list to one ISO date.
    #[serde(default)]
    pub date: Option<String>,
}

/// Changes to an existing content entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentUpdate {
    /// The new text.
    pub text: String,
    /// Moves the entry to another period.
    #[serde(default)]
    pub period: Option<u32>,
    /// Moves the entry to another ISO date.
    #[serde(default)]
    pub date: Option<String>,
}
