//! Board session: the synchronization core.
//!
//! Owns the authoritative in-memory patient list and keeps it consistent
//! with either the remote change feed or the local store. Remote mode
//! treats the feed as the single source of truth: a write issued here never
//! touches the list directly, the echoed event does. Local mode has no echo
//! channel, so every mutation updates memory and persistence synchronously
//! and raises its own notification.

use thiserror::Error;

use crate::models::{BoardConfig, ChangeEvent, PatientRecord, PatientStatus};
use crate::notify::{NotificationClass, Notifier};
use crate::store::{LocalStore, QueueStore, RemoteStore, RemoteTransport, StoreError, Subscription};

/// Board errors.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type BoardResult<T> = Result<T, BoardError>;

/// One desk's view of the queue, bound to a local store and one remote
/// transport for its whole lifetime. Reconfiguration switches modes; the
/// transport connection and subscription are torn down deterministically.
pub struct BoardSession {
    patients: Vec<PatientRecord>,
    local: LocalStore,
    transport: Box<dyn RemoteTransport + Send>,
    subscription: Option<Subscription>,
    /// Bumped on every reconfigure; results and events tagged with an older
    /// generation are discarded.
    generation: u64,
    connected: bool,
    notifier: Notifier,
}

impl BoardSession {
    /// Create a session in local mode. Call [`reconfigure`](Self::reconfigure)
    /// to load state and select a backend.
    pub fn new(
        local: LocalStore,
        transport: Box<dyn RemoteTransport + Send>,
        notifier: Notifier,
    ) -> Self {
        Self {
            patients: Vec::new(),
            local,
            transport,
            subscription: None,
            generation: 0,
            connected: false,
            notifier,
        }
    }

    /// Current list, in board order.
    pub fn patients(&self) -> &[PatientRecord] {
        &self.patients
    }

    /// Whether the remote backend is live.
    pub fn is_remote_connected(&self) -> bool {
        self.connected
    }

    /// Notifier access for visibility changes from the host.
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Re-evaluate the backend mode. Runs the teardown / connect / fallback
    /// machine:
    ///
    /// 1. Close any existing subscription unconditionally and advance the
    ///    generation, so nothing from the superseded run can apply.
    /// 2. Remote fully configured: connect, replace the list with the full
    ///    fetch ordered by `created_at`, open exactly one subscription.
    /// 3. Otherwise, or on connect failure, fall back to the local store.
    pub fn reconfigure(&mut self, config: &BoardConfig) -> BoardResult<()> {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        if let Some(sub) = self.subscription.take() {
            sub.close();
        }
        self.connected = false;

        if let Some((url, key)) = config.remote_endpoint() {
            match self.connect_remote(url, key, generation) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!("remote backend unavailable, using local store: {e}");
                }
            }
        }

        self.patients = self.local.fetch_all()?;
        Ok(())
    }

    fn connect_remote(&mut self, url: &str, key: &str, generation: u64) -> BoardResult<()> {
        self.transport.connect(url, key)?;
        let rows = self.transport.fetch_all()?;

        // A later reconfigure may have superseded this run while the
        // round-trips were in flight; its results are discarded silently.
        if generation != self.generation {
            return Ok(());
        }

        self.patients = rows;
        if self.subscription.is_none() {
            self.subscription = Some(self.transport.subscribe(generation)?);
        }
        self.connected = true;
        Ok(())
    }

    /// Drain ready feed events and apply them to the list. Events from a
    /// superseded generation are dropped. Returns the number drained.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        loop {
            let event = {
                let sub = match self.subscription.as_ref() {
                    Some(sub) if sub.generation() == self.generation => sub,
                    _ => break,
                };
                match sub.try_next() {
                    Some(event) => event,
                    None => break,
                }
            };
            self.apply_event(event);
            drained += 1;
        }
        drained
    }

    /// Apply one push-delivered change to the in-memory list.
    fn apply_event(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Insert { record } => {
                // At-least-once feed: the row may already be present from
                // the initial fetch or a duplicate delivery.
                if self.patients.iter().any(|p| p.id == record.id) {
                    return;
                }
                let message = format!("새 메모: {}", record.name);
                self.patients.push(record);
                self.notifier.notify(&message, NotificationClass::Alert);
            }
            ChangeEvent::Update { record } => {
                let status = record.status;
                let name = record.name.clone();
                if let Some(slot) = self.patients.iter_mut().find(|p| p.id == record.id) {
                    *slot = record;
                }
                self.notify_status_change(&name, status);
            }
            ChangeEvent::Delete { id } => {
                self.patients.retain(|p| p.id != id);
            }
        }
    }

    /// Add a patient entry.
    ///
    /// Remote mode issues the insert and returns; the visible change
    /// arrives through the feed. Local mode appends, persists, and
    /// notifies synchronously.
    pub fn add(&mut self, name: &str, treatment: &str) -> BoardResult<()> {
        if self.connected {
            // The server assigns id and created_at; only the payload
            // columns go out.
            self.transport
                .insert_row(name, treatment, PatientStatus::Waiting)?;
            return Ok(());
        }

        let record = PatientRecord::new(name.to_string(), treatment.to_string());
        self.local.insert(&record)?;
        let message = format!("새 메모: {}", record.name);
        self.patients.push(record);
        self.notifier.notify(&message, NotificationClass::Alert);
        Ok(())
    }

    /// Move an entry between lifecycle stages. `Done` deletes the record
    /// instead of storing the state.
    pub fn update_status(&mut self, id: &str, status: PatientStatus) -> BoardResult<()> {
        if status.is_terminal() {
            return self.remove(id);
        }

        if self.connected {
            let store = RemoteStore::new(self.transport.as_ref());
            if let Err(e) = store.update_status(id, status) {
                log::error!("remote status update failed for {id}: {e}");
            }
            // The feed applies the visible change.
            return Ok(());
        }

        match self.local.update_status(id, status) {
            Ok(()) => {}
            // The row vanished under us; nothing to move.
            Err(StoreError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        let name = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .map(|p| {
                p.status = status;
                p.name.clone()
            })
            .unwrap_or_default();
        self.notify_status_change(&name, status);
        Ok(())
    }

    /// Remove an entry by id.
    pub fn remove(&mut self, id: &str) -> BoardResult<()> {
        if self.connected {
            let store = RemoteStore::new(self.transport.as_ref());
            if let Err(e) = store.delete(id) {
                log::error!("remote delete failed for {id}: {e}");
            }
            return Ok(());
        }

        self.local.delete(id)?;
        self.patients.retain(|p| p.id != id);
        Ok(())
    }

    fn notify_status_change(&mut self, name: &str, status: PatientStatus) {
        match status {
            PatientStatus::InProgress => self
                .notifier
                .notify(&format!("확인 중: {name}"), NotificationClass::Success),
            PatientStatus::Waiting => self
                .notifier
                .notify(&format!("대기 이동: {name}"), NotificationClass::Info),
            PatientStatus::Done => {}
        }
    }
}
