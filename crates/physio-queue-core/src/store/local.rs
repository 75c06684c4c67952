//! Local persistence: the full patient list in one SQLite slot.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{QueueStore, StoreError, StoreResult};
use crate::models::{PatientRecord, PatientStatus};

/// Schema for the local slot store.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS board_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO board_state (key, value) VALUES ('patients', '[]');
"#;

/// Slot key holding the serialized patient list.
const PATIENTS_KEY: &str = "patients";

/// Key-value persistence for the patient list.
///
/// One named slot holds the serialized full list; a write replaces the slot
/// in a single statement, so readers always see the last complete list.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open the store at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Read the persisted list; empty if the slot was never written.
    pub fn read_list(&self) -> StoreResult<Vec<PatientRecord>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM board_state WHERE key = ?",
                [PATIENTS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the slot with the given list.
    pub fn write_list(&self, records: &[PatientRecord]) -> StoreResult<()> {
        let json = serde_json::to_string(records)?;
        self.conn.execute(
            r#"
            INSERT INTO board_state (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![PATIENTS_KEY, json],
        )?;
        Ok(())
    }
}

impl QueueStore for LocalStore {
    fn fetch_all(&self) -> StoreResult<Vec<PatientRecord>> {
        self.read_list()
    }

    fn insert(&self, record: &PatientRecord) -> StoreResult<()> {
        let mut records = self.read_list()?;
        records.push(record.clone());
        self.write_list(&records)
    }

    fn update_status(&self, id: &str, status: PatientStatus) -> StoreResult<()> {
        let mut records = self.read_list()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        slot.status = status;
        self.write_list(&records)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.read_list()?;
        records.retain(|r| r.id != id);
        self.write_list(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> LocalStore {
        LocalStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_empty_slot_reads_empty_list() {
        let store = setup_store();
        assert!(store.read_list().unwrap().is_empty());
    }

    #[test]
    fn test_insert_preserves_order() {
        let store = setup_store();

        let first = PatientRecord::new("3333 김진료".into(), "도수대기".into());
        let second = PatientRecord::new("김진표".into(), "충격파".into());
        store.insert(&first).unwrap();
        store.insert(&second).unwrap();

        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, second.id);
    }

    #[test]
    fn test_update_status() {
        let store = setup_store();

        let record = PatientRecord::new("김진표".into(), "충격파".into());
        store.insert(&record).unwrap();
        store
            .update_status(&record.id, PatientStatus::InProgress)
            .unwrap();

        let records = store.read_list().unwrap();
        assert_eq!(records[0].status, PatientStatus::InProgress);
    }

    #[test]
    fn test_update_status_missing_row() {
        let store = setup_store();
        let result = store.update_status("no-such-id", PatientStatus::Waiting);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let store = setup_store();

        let record = PatientRecord::new("김진표".into(), "충격파".into());
        store.insert(&record).unwrap();
        store.delete(&record.id).unwrap();

        assert!(store.read_list().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_reads_last_written_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");

        let record = PatientRecord::new("2343/주한솔".into(), "충격파 대기".into());
        {
            let store = LocalStore::open(&path).unwrap();
            store.insert(&record).unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        let records = store.read_list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "2343/주한솔");
    }
}
