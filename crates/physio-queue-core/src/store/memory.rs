//! In-process backend simulator implementing [`RemoteTransport`].
//!
//! Stands in for the hosted realtime table in tests: multiple clients
//! share one [`MemoryServer`], every mutation is echoed to all open
//! subscriptions (the writer included), and duplicate delivery can be
//! switched on to exercise the at-least-once contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use super::{StoreError, StoreResult, Subscription};
use crate::models::{ChangeEvent, PatientRecord, PatientStatus};

struct Subscriber {
    tx: Sender<ChangeEvent>,
    closed: Arc<AtomicBool>,
}

#[derive(Default)]
struct ServerState {
    rows: Vec<PatientRecord>,
    next_id: u64,
    subscribers: Vec<Subscriber>,
    duplicate_delivery: bool,
}

impl ServerState {
    fn broadcast(&mut self, event: ChangeEvent) {
        // Prune closed or hung-up subscribers while delivering.
        self.subscribers.retain(|sub| {
            if sub.closed.load(Ordering::SeqCst) {
                return false;
            }
            sub.tx.send(event.clone()).is_ok()
        });
        // At-least-once channel: inserts may arrive twice.
        if self.duplicate_delivery {
            if let ChangeEvent::Insert { .. } = event {
                for sub in &self.subscribers {
                    let _ = sub.tx.send(event.clone());
                }
            }
        }
    }
}

/// Shared server side of the simulated backend.
#[derive(Clone)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    /// Create an empty server.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::default())),
        }
    }

    /// New client handle on this server.
    pub fn client(&self) -> MemoryTransport {
        MemoryTransport {
            state: self.state.clone(),
            connected: AtomicBool::new(false),
            fail_connect: false,
        }
    }

    /// Client handle whose connect attempts always fail.
    pub fn failing_client(&self) -> MemoryTransport {
        MemoryTransport {
            state: self.state.clone(),
            connected: AtomicBool::new(false),
            fail_connect: true,
        }
    }

    /// Deliver insert events twice to every subscriber.
    pub fn set_duplicate_delivery(&self, enabled: bool) {
        self.state.lock().expect("server lock").duplicate_delivery = enabled;
    }

    /// Preload a row without broadcasting, as if it predates every client.
    pub fn seed_row(&self, record: PatientRecord) {
        self.state.lock().expect("server lock").rows.push(record);
    }

    /// Number of subscriptions the server still delivers to.
    pub fn active_subscribers(&self) -> usize {
        let mut state = self.state.lock().expect("server lock");
        state
            .subscribers
            .retain(|sub| !sub.closed.load(Ordering::SeqCst));
        state.subscribers.len()
    }

    /// Current row count.
    pub fn row_count(&self) -> usize {
        self.state.lock().expect("server lock").rows.len()
    }
}

/// Client side of the simulated backend.
pub struct MemoryTransport {
    state: Arc<Mutex<ServerState>>,
    connected: AtomicBool,
    fail_connect: bool,
}

impl MemoryTransport {
    fn state(&self) -> StoreResult<std::sync::MutexGuard<'_, ServerState>> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("not connected".into()));
        }
        self.state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("server lock poisoned: {e}")))
    }
}

impl super::RemoteTransport for MemoryTransport {
    fn connect(&self, url: &str, _key: &str) -> StoreResult<()> {
        if self.fail_connect || url.is_empty() {
            return Err(StoreError::Unavailable(format!(
                "connect refused for {url}"
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_all(&self) -> StoreResult<Vec<PatientRecord>> {
        let state = self.state()?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    fn insert_row(&self, name: &str, treatment: &str, status: PatientStatus) -> StoreResult<()> {
        let mut state = self.state()?;
        state.next_id += 1;
        let record = PatientRecord {
            id: format!("srv-{}", state.next_id),
            name: name.to_string(),
            treatment: treatment.to_string(),
            status,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        state.rows.push(record.clone());
        state.broadcast(ChangeEvent::Insert { record });
        Ok(())
    }

    fn update_row_status(&self, id: &str, status: PatientStatus) -> StoreResult<()> {
        let mut state = self.state()?;
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.status = status;
        let record = row.clone();
        state.broadcast(ChangeEvent::Update { record });
        Ok(())
    }

    fn delete_row(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state()?;
        let before = state.rows.len();
        state.rows.retain(|r| r.id != id);
        if state.rows.len() < before {
            state.broadcast(ChangeEvent::Delete { id: id.to_string() });
        }
        Ok(())
    }

    fn subscribe(&self, generation: u64) -> StoreResult<Subscription> {
        let mut state = self.state()?;
        let (tx, rx) = mpsc::channel();
        let closed = Arc::new(AtomicBool::new(false));
        state.subscribers.push(Subscriber {
            tx,
            closed: closed.clone(),
        });
        Ok(Subscription::new(generation, rx, closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RemoteTransport;

    #[test]
    fn test_requires_connect() {
        let server = MemoryServer::new();
        let client = server.client();
        assert!(matches!(
            client.fetch_all(),
            Err(StoreError::Unavailable(_))
        ));

        client.connect("http://board.test", "key").unwrap();
        assert!(client.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_failing_client_never_connects() {
        let server = MemoryServer::new();
        let client = server.failing_client();
        assert!(client.connect("http://board.test", "key").is_err());
    }

    #[test]
    fn test_insert_echoes_to_writer() {
        let server = MemoryServer::new();
        let client = server.client();
        client.connect("http://board.test", "key").unwrap();

        let sub = client.subscribe(1).unwrap();
        client
            .insert_row("김진표", "충격파", PatientStatus::Waiting)
            .unwrap();

        match sub.try_next() {
            Some(ChangeEvent::Insert { record }) => {
                assert_eq!(record.name, "김진표");
                assert_eq!(record.id, "srv-1");
            }
            other => panic!("expected insert echo, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_delivery_sends_insert_twice() {
        let server = MemoryServer::new();
        server.set_duplicate_delivery(true);
        let client = server.client();
        client.connect("http://board.test", "key").unwrap();

        let sub = client.subscribe(1).unwrap();
        client
            .insert_row("김진표", "충격파", PatientStatus::Waiting)
            .unwrap();

        assert!(matches!(sub.try_next(), Some(ChangeEvent::Insert { .. })));
        assert!(matches!(sub.try_next(), Some(ChangeEvent::Insert { .. })));
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_closed_subscriber_is_pruned() {
        let server = MemoryServer::new();
        let client = server.client();
        client.connect("http://board.test", "key").unwrap();

        let sub = client.subscribe(1).unwrap();
        assert_eq!(server.active_subscribers(), 1);

        sub.close();
        assert_eq!(server.active_subscribers(), 0);
    }

    #[test]
    fn test_update_missing_row() {
        let server = MemoryServer::new();
        let client = server.client();
        client.connect("http://board.test", "key").unwrap();
        assert!(matches!(
            client.update_row_status("srv-99", PatientStatus::InProgress),
            Err(StoreError::NotFound(_))
        ));
    }
}
