use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use super::domain::{Candidate, CandidateId};

/// Storage key holding the JSON array of accepted candidates.
pub const SAVED_CANDIDATES_KEY: &str = "savedCandidates";

const EVENT_CAPACITY: usize = 16;

/// A single key of local key-value storage holding one serialized document.
pub trait KeyValueSlot: Send + Sync {
    fn key(&self) -> &str;
    /// Current value, `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, SlotError>;
    /// Replace the whole value.
    fn write(&self, value: &str) -> Result<(), SlotError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("slot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("slot unavailable: {0}")]
    Unavailable(String),
    /// The stored bytes are not text at all.
    #[error("slot value is not valid UTF-8: {0}")]
    Undecodable(#[from] std::string::FromUtf8Error),
}

/// Slot persisted as `<data_dir>/<key>.json`, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    key: String,
    path: PathBuf,
}

impl FileSlot {
    pub fn new(data_dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        let key = key.into();
        let path = data_dir.as_ref().join(format!("{key}.json"));
        Self { key, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueSlot for FileSlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(String::from_utf8(bytes)?))
    }

    fn write(&self, value: &str) -> Result<(), SlotError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// In-process slot, handy for tests and demos.
#[derive(Debug)]
pub struct MemorySlot {
    key: String,
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Mutex::new(None),
        }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Mutex::new(Some(value.into())),
        }
    }

    pub fn value(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MemorySlot {
    fn default() -> Self {
        Self::new(SAVED_CANDIDATES_KEY)
    }
}

impl KeyValueSlot for MemorySlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        let guard = self
            .value
            .lock()
            .map_err(|_| SlotError::Unavailable("memory slot poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn write(&self, value: &str) -> Result<(), SlotError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| SlotError::Unavailable("memory slot poisoned".to_string()))?;
        *guard = Some(value.to_string());
        Ok(())
    }
}

/// Origin of a storage change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChange {
    /// Written through this process's store.
    Local,
    /// Written by another process; only known because someone said so.
    External,
}

/// Explicit change feed for a slot. Subscribers are never polled on their behalf.
#[derive(Debug, Clone)]
pub struct StorageEvents {
    sender: broadcast::Sender<StorageChange>,
}

impl StorageEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> StorageSubscription {
        StorageSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn publish(&self, change: StorageChange) {
        // no subscribers is not an error
        let _ = self.sender.send(change);
    }
}

impl Default for StorageEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct StorageSubscription {
    receiver: broadcast::Receiver<StorageChange>,
}

impl StorageSubscription {
    /// Drain queued notifications. Returns true when at least one change arrived since the
    /// previous call; an overflowed queue also counts as a change.
    pub fn take_pending(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return changed,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendOutcome {
    Appended,
    AlreadySaved,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("saved candidates could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Ordered list of accepted candidates kept in one slot, unique by id.
///
/// Every mutation re-reads the slot, applies the change and writes the whole list back.
/// Writers in other processes are not coordinated: the last write wins.
pub struct AcceptanceStore<S> {
    slot: Arc<S>,
    write_lock: Mutex<()>,
    events: StorageEvents,
}

impl<S> AcceptanceStore<S>
where
    S: KeyValueSlot,
{
    pub fn new(slot: Arc<S>) -> Self {
        Self {
            slot,
            write_lock: Mutex::new(()),
            events: StorageEvents::new(),
        }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn events(&self) -> &StorageEvents {
        &self.events
    }

    pub fn subscribe(&self) -> StorageSubscription {
        self.events.subscribe()
    }

    /// Signal that another process changed the slot.
    pub fn notify_external(&self) {
        self.events.publish(StorageChange::External);
    }

    /// Every saved candidate in acceptance order.
    ///
    /// A missing key reads as an empty list, and so does a value that is not a valid
    /// candidate array: malformed data is logged and ignored, never surfaced.
    pub fn load_all(&self) -> Result<Vec<Candidate>, StoreError> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(SlotError::Undecodable(err)) => {
                warn!(key = self.slot.key(), error = %err, "ignoring undecodable saved candidates");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Vec<Candidate>>(&raw) {
            Ok(candidates) => Ok(candidates),
            Err(err) => {
                warn!(key = self.slot.key(), error = %err, "ignoring malformed saved candidates");
                Ok(Vec::new())
            }
        }
    }

    /// Append `candidate` unless its id is already saved.
    pub fn append(&self, candidate: Candidate) -> Result<AppendOutcome, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut candidates = self.load_all()?;
        if candidates.iter().any(|saved| saved.id == candidate.id) {
            debug!(id = %candidate.id, "candidate already saved");
            return Ok(AppendOutcome::AlreadySaved);
        }

        let id = candidate.id;
        candidates.push(candidate);
        self.persist(&candidates)?;
        debug!(%id, total = candidates.len(), "candidate saved");
        Ok(AppendOutcome::Appended)
    }

    /// Remove the candidate with `id`. Returns false, without writing, when absent.
    pub fn remove(&self, id: CandidateId) -> Result<bool, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut candidates = self.load_all()?;
        let before = candidates.len();
        candidates.retain(|saved| saved.id != id);
        if candidates.len() == before {
            return Ok(false);
        }

        self.persist(&candidates)?;
        debug!(%id, total = candidates.len(), "candidate removed");
        Ok(true)
    }

    fn persist(&self, candidates: &[Candidate]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(candidates)?;
        self.slot.write(&encoded)?;
        self.events.publish(StorageChange::Local);
        Ok(())
    }
}
