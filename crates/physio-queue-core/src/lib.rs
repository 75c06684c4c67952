//! PhysioFlow Queue Core Library
//!
//! Clinic front-desk queue board: staff enter a patient name and a short
//! memo, the entry appears in a waiting list, moves to in-progress, and is
//! removed on completion.
//!
//! # Architecture
//!
//! ```text
//! Desk input ─→ parser ─→ BoardSession ──┬─→ RemoteStore ─→ hosted table
//!                              │         │        ▲
//!                              │         │        │ change feed (push)
//!                              │         │        ▼
//!                              │         │   Subscription ─→ pump()
//!                              │         │
//!                              │         └─→ LocalStore (SQLite slot)
//!                              ▼
//!                          Notifier ─→ chime / desktop / badge
//! ```
//!
//! # Core Principle
//!
//! Remote mode never mutates the in-memory list optimistically: the change
//! feed is the single source of truth, so an echoed event is applied once
//! and only once. Local mode has no echo channel and mutates synchronously.
//!
//! # Modules
//!
//! - [`board`]: the synchronization core ([`BoardSession`])
//! - [`models`]: domain types (PatientRecord, ChangeEvent, BoardConfig)
//! - [`store`]: local SQLite slot and remote transport backends
//! - [`parser`]: deterministic desk-input parser
//! - [`notify`]: chime, desktop notification, and badge service

pub mod board;
pub mod models;
pub mod notify;
pub mod parser;
pub mod store;

// Re-export commonly used types
pub use board::{BoardError, BoardSession};
pub use models::{BoardConfig, ChangeEvent, PatientRecord, PatientStatus};
pub use notify::{NotificationClass, Notifier, NotifyError, NotifySink, NullSink, Visibility};
pub use parser::{parse_entry, ParsedEntry, DEFAULT_TREATMENT};
pub use store::{
    LocalStore, MemoryServer, MemoryTransport, QueueStore, RemoteStore, RemoteTransport,
    StoreError, Subscription,
};

use std::sync::{Arc, Mutex};

/// Top-level error for embedders.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("store error: {0}")]
    Store(String),

    #[error("board error: {0}")]
    Board(String),
}

impl From<StoreError> for QueueError {
    fn from(e: StoreError) -> Self {
        QueueError::Store(e.to_string())
    }
}

impl From<BoardError> for QueueError {
    fn from(e: BoardError) -> Self {
        QueueError::Board(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for QueueError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        QueueError::Board(format!("lock poisoned: {e}"))
    }
}

/// Open a board over a local database file.
pub fn open_board(
    path: &str,
    transport: Box<dyn RemoteTransport + Send>,
    sink: Box<dyn NotifySink + Send>,
) -> Result<BoardHandle, QueueError> {
    let local = LocalStore::open(path)?;
    Ok(BoardHandle::new(local, transport, sink))
}

/// Open a board over an in-memory database (for testing).
pub fn open_board_in_memory(
    transport: Box<dyn RemoteTransport + Send>,
    sink: Box<dyn NotifySink + Send>,
) -> Result<BoardHandle, QueueError> {
    let local = LocalStore::open_in_memory()?;
    Ok(BoardHandle::new(local, transport, sink))
}

/// Thread-safe session wrapper for embedding under a UI shell.
pub struct BoardHandle {
    session: Arc<Mutex<BoardSession>>,
}

impl BoardHandle {
    fn new(
        local: LocalStore,
        transport: Box<dyn RemoteTransport + Send>,
        sink: Box<dyn NotifySink + Send>,
    ) -> Self {
        let session = BoardSession::new(local, transport, Notifier::new(sink));
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Re-evaluate the backend mode from configuration.
    pub fn reconfigure(&self, config: &BoardConfig) -> Result<(), QueueError> {
        let mut session = self.session.lock()?;
        session.reconfigure(config)?;
        Ok(())
    }

    /// Snapshot of the current list, in board order.
    pub fn patients(&self) -> Result<Vec<PatientRecord>, QueueError> {
        let session = self.session.lock()?;
        Ok(session.patients().to_vec())
    }

    /// Whether the remote backend is live.
    pub fn is_remote_connected(&self) -> Result<bool, QueueError> {
        let session = self.session.lock()?;
        Ok(session.is_remote_connected())
    }

    /// Add an entry; desk input goes through [`parse_entry`] first.
    pub fn add(&self, name: &str, treatment: &str) -> Result<(), QueueError> {
        let mut session = self.session.lock()?;
        session.add(name, treatment)?;
        Ok(())
    }

    /// Parse raw desk input and add the resulting entry.
    pub fn add_raw(&self, raw: &str) -> Result<(), QueueError> {
        let entry = parse_entry(raw);
        self.add(&entry.name, &entry.treatment)
    }

    /// Move an entry between lifecycle stages; `Done` deletes it.
    pub fn update_status(&self, id: &str, status: PatientStatus) -> Result<(), QueueError> {
        let mut session = self.session.lock()?;
        session.update_status(id, status)?;
        Ok(())
    }

    /// Remove an entry by id.
    pub fn remove(&self, id: &str) -> Result<(), QueueError> {
        let mut session = self.session.lock()?;
        session.remove(id)?;
        Ok(())
    }

    /// Drain ready feed events into the list.
    pub fn pump(&self) -> Result<usize, QueueError> {
        let mut session = self.session.lock()?;
        Ok(session.pump())
    }

    /// Report a window visibility change to the notification service.
    pub fn set_visibility(&self, visibility: Visibility) -> Result<(), QueueError> {
        let mut session = self.session.lock()?;
        session.notifier_mut().set_visibility(visibility);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_local_roundtrip() {
        let server = MemoryServer::new();
        let handle =
            open_board_in_memory(Box::new(server.client()), Box::new(NullSink)).unwrap();
        handle.reconfigure(&BoardConfig::local()).unwrap();

        handle.add_raw("3333 김진료 도수대기").unwrap();
        let patients = handle.patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "3333 김진료");
        assert_eq!(patients[0].treatment, "도수대기");

        handle
            .update_status(&patients[0].id, PatientStatus::Done)
            .unwrap();
        assert!(handle.patients().unwrap().is_empty());
    }

    #[test]
    fn test_handle_moves_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<BoardHandle>();

        let server = MemoryServer::new();
        let handle =
            open_board_in_memory(Box::new(server.client()), Box::new(NullSink)).unwrap();
        handle.reconfigure(&BoardConfig::local()).unwrap();

        let handle = std::thread::spawn(move || {
            handle.add("김진표", "충격파").unwrap();
            handle
        })
        .join()
        .unwrap();

        assert_eq!(handle.patients().unwrap().len(), 1);
    }
}
