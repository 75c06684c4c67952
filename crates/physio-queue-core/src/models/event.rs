//! Change feed events pushed by the remote backend.

use serde::{Deserialize, Serialize};

use super::PatientRecord;

/// A row-change event on the `patients` table.
///
/// Delivery is at-least-once: the backend may echo a row this client just
/// wrote, and may deliver the same insert twice. Consumers must guard
/// inserts by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A row was inserted.
    Insert { record: PatientRecord },
    /// A row was updated; carries the full new row.
    Update { record: PatientRecord },
    /// A row was deleted.
    Delete { id: String },
}

impl ChangeEvent {
    /// Id of the affected row.
    pub fn record_id(&self) -> &str {
        match self {
            ChangeEvent::Insert { record } | ChangeEvent::Update { record } => &record.id,
            ChangeEvent::Delete { id } => id,
        }
    }
}
