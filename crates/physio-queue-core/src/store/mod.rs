//! Storage backends for the queue board.
//!
//! Two passive backends implement [`QueueStore`]: [`LocalStore`] persists
//! the full list in a SQLite slot, [`RemoteStore`] issues row operations
//! against a hosted `patients` table through a [`RemoteTransport`]. Neither
//! initiates change on its own; the board session is the sole mutator of
//! the in-memory list.

mod local;
mod memory;
mod remote;

pub use local::*;
pub use memory::*;
pub use remote::*;

use thiserror::Error;

use crate::models::{PatientRecord, PatientStatus};

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row not found: {0}")]
    NotFound(String),

    #[error("remote backend unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-agnostic row operations shared by local and remote storage.
pub trait QueueStore {
    /// Full current row set, ordered by `created_at` ascending.
    fn fetch_all(&self) -> StoreResult<Vec<PatientRecord>>;

    /// Insert a new row with status `waiting`.
    fn insert(&self, record: &PatientRecord) -> StoreResult<()>;

    /// Update the status column of a row.
    fn update_status(&self, id: &str, status: PatientStatus) -> StoreResult<()>;

    /// Delete a row by id.
    fn delete(&self, id: &str) -> StoreResult<()>;
}
