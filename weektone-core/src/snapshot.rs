//! Snapshots make the aggregate state durable across restarts. The job saves
//! the full state at every batch boundary and restores it once at startup.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Encode a state value for persistence
pub fn serialize_state<S: Serialize>(state: &S) -> Result<Vec<u8>, PersistenceError> {
    Ok(rmp_serde::to_vec(state)?)
}

/// Decode a previously persisted state value
pub fn deserialize_state<S: DeserializeOwned>(bytes: &[u8]) -> Result<S, PersistenceError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Failure saving or restoring a snapshot. Fatal for the batch cycle in
/// which it occurs: the batch must not be acknowledged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the snapshot storage failed
    #[error("snapshot storage error")]
    Io(#[from] std::io::Error),
    /// The state could not be encoded
    #[error("could not encode state")]
    Encode(#[from] rmp_serde::encode::Error),
    /// A persisted snapshot could not be decoded
    #[error("could not decode persisted state")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// A persistence backend stores the full aggregate state as one opaque blob.
///
/// `save` replaces the previous snapshot atomically with respect to a batch
/// boundary: after a restart, `load` returns either the old or the new
/// snapshot, never a torn mix.
pub trait PersistenceBackend: 'static {
    /// Restore the last saved snapshot, `None` if none exists
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError>;
    /// Durably save the given snapshot, replacing any previous one
    fn save(&mut self, state: &[u8]) -> Result<(), PersistenceError>;
}

/// A backend which does not retain any data. Useful for tests or jobs which
/// should always restart from an empty state.
#[derive(Debug, Clone, Default)]
pub struct NoPersistence;

impl PersistenceBackend for NoPersistence {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(None)
    }

    fn save(&mut self, _state: &[u8]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Snapshot storage in a single local file.
///
/// Saving writes a sibling temp file first and renames it over the target,
/// so an interrupted save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a backend storing its snapshot at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl PersistenceBackend for FileBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, state: &[u8]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let staging = self.staging_path();
        fs::write(&staging, state)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// A backend which captures the snapshot into shared memory. Clones share
/// the same storage, so a test can hand one clone to a job and inspect or
/// reuse the snapshot through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    snapshot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::unwrap_used)]
impl PersistenceBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn save(&mut self, state: &[u8]) -> Result<(), PersistenceError> {
        *self.snapshot.lock().unwrap() = Some(state.to_vec());
        Ok(())
    }
}
