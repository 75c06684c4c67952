//! Patient queue entry models.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a queue entry.
///
/// `Done` is transient: transitioning to it deletes the record, so it is
/// never persisted or kept in memory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PatientStatus {
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl PatientStatus {
    /// Whether this status removes the record instead of being stored.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PatientStatus::Done)
    }
}

/// One queue entry: a person plus the free-text memo staff attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Unique within the active list. Generated client-side in local mode,
    /// server-assigned in remote mode.
    pub id: String,
    /// Free text; may embed a numeric prefix and a separator.
    pub name: String,
    /// Free-text memo
    pub treatment: String,
    /// Current lifecycle stage
    pub status: PatientStatus,
    /// RFC 3339 timestamp, used only for stable ordering
    pub created_at: String,
}

impl PatientRecord {
    /// Create a new waiting entry with a locally generated id.
    pub fn new(name: String, treatment: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            treatment,
            status: PatientStatus::Waiting,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check if this entry is still in the waiting column.
    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }
}
