//! Remote backend: row operations plus a push subscription over a
//! transport seam.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use super::{QueueStore, StoreResult};
use crate::models::{ChangeEvent, PatientRecord, PatientStatus};

/// Wire seam to the hosted `patients` table.
///
/// Implementations take `&self` and manage connection state internally so a
/// session can hold one transport across reconfigurations. Every operation
/// other than [`connect`](RemoteTransport::connect) fails with
/// `StoreError::Unavailable` when no connection is established.
pub trait RemoteTransport {
    /// Establish (or re-establish) the connection.
    fn connect(&self, url: &str, key: &str) -> StoreResult<()>;

    /// Select all rows ordered by `created_at` ascending.
    fn fetch_all(&self) -> StoreResult<Vec<PatientRecord>>;

    /// Insert a row. The server assigns id and timestamp; the created row
    /// comes back through the change feed, not the return value.
    fn insert_row(&self, name: &str, treatment: &str, status: PatientStatus) -> StoreResult<()>;

    /// Update the status column of a row.
    fn update_row_status(&self, id: &str, status: PatientStatus) -> StoreResult<()>;

    /// Delete a row by id.
    fn delete_row(&self, id: &str) -> StoreResult<()>;

    /// Open a change-event subscription on the `patients` table.
    fn subscribe(&self, generation: u64) -> StoreResult<Subscription>;
}

/// Handle to one live change-event subscription.
///
/// Tagged with the configuration generation that opened it so a session can
/// drop events from a superseded run. Closing is idempotent and also
/// happens on drop, which keeps at most one live subscription per session.
pub struct Subscription {
    generation: u64,
    rx: Receiver<ChangeEvent>,
    closed: Arc<AtomicBool>,
}

impl Subscription {
    /// Build a subscription from a feed receiver and a shared close flag.
    pub fn new(generation: u64, rx: Receiver<ChangeEvent>, closed: Arc<AtomicBool>) -> Self {
        Self {
            generation,
            rx,
            closed,
        }
    }

    /// Generation of the configuration run that opened this subscription.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Next ready event, without blocking.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Stop the feed. The sender side drops this subscriber on its next send.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the subscription has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Remote variant of the storage seam, borrowing the session's transport.
pub struct RemoteStore<'a> {
    transport: &'a dyn RemoteTransport,
}

impl<'a> RemoteStore<'a> {
    /// Wrap a connected transport.
    pub fn new(transport: &'a dyn RemoteTransport) -> Self {
        Self { transport }
    }
}

impl QueueStore for RemoteStore<'_> {
    fn fetch_all(&self) -> StoreResult<Vec<PatientRecord>> {
        self.transport.fetch_all()
    }

    fn insert(&self, record: &PatientRecord) -> StoreResult<()> {
        // Server assigns id and created_at; only the payload columns go out.
        self.transport
            .insert_row(&record.name, &record.treatment, record.status)
    }

    fn update_status(&self, id: &str, status: PatientStatus) -> StoreResult<()> {
        self.transport.update_row_status(id, status)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.transport.delete_row(id)
    }
}
