//! Snapshot Store Adapters
//!
//! Implements `SnapshotStore` as a JSON file on disk and as an in-memory
//! buffer. Both go through the same JSON encoding.

use super::store_lock::StoreLock;
use crate::domain::{RegistryError, RegistrySnapshot, SNAPSHOT_VERSION};
use crate::ports::outbound::SnapshotStore;
use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

fn encode(snapshot: &RegistrySnapshot) -> Result<Vec<u8>, RegistryError> {
    serde_json::to_vec_pretty(snapshot)
        .map_err(|e| RegistryError::Storage(format!("encode snapshot: {e}")))
}

fn decode(bytes: &[u8]) -> Result<RegistrySnapshot, RegistryError> {
    let snapshot: RegistrySnapshot = serde_json::from_slice(bytes)
        .map_err(|e| RegistryError::Storage(format!("decode snapshot: {e}")))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(RegistryError::Storage(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    Ok(snapshot)
}

fn io_error(context: String, e: std::io::Error) -> RegistryError {
    RegistryError::Storage(format!("{context}: {e}"))
}

/// JSON file store.
///
/// Writes go to a uniquely named sibling temporary file which is then renamed
/// over the target, so a crash never leaves a half-written snapshot and a
/// failed write leaves no temporary file behind.
///
/// The rename only prevents torn files. Callers that load, mutate and save
/// must hold [`JsonFileStore::lock`] for the whole sequence.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exclusive lock on the snapshot, held until the guard is dropped.
    ///
    /// Blocks while another holder (thread or process) has it.
    pub fn lock(&self) -> Result<StoreLock, RegistryError> {
        StoreLock::acquire(&self.lock_path())
    }

    /// Sibling lock file, `<file>.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        let bytes = encode(snapshot)?;
        let parent = self.parent_dir();

        fs::create_dir_all(&parent)
            .map_err(|e| io_error(format!("create {}", parent.display()), e))?;

        // Dropped (and deleted) on any early return
        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| io_error(format!("create temp file in {}", parent.display()), e))?;
        temp.write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| io_error(format!("write {}", temp.path().display()), e))?;
        temp.persist(&self.path)
            .map_err(|e| io_error(format!("rename to {}", self.path.display()), e.error))?;

        info!(
            path = %self.path.display(),
            issuers = snapshot.entries.len(),
            "Registry snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>, RegistryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No registry snapshot on disk");
                return Ok(None);
            }
            Err(e) => {
                return Err(RegistryError::Storage(format!(
                    "read {}: {e}",
                    self.path.display()
                )))
            }
        };
        decode(&bytes).map(Some)
    }
}

/// In-memory store holding the encoded snapshot.
#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<Option<Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemoryStore {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        let bytes = encode(snapshot)?;
        *self.data.lock() = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>, RegistryError> {
        self.data.lock().as_deref().map(decode).transpose()
    }
}
