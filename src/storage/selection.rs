//! Persisted selection shared between the app and the widget.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

/// Key under which the selection is stored.
pub const SELECTED_ID_KEY: &str = "selectedId";

/// Narrow key-value view of the shared selection.
///
/// One instance is injected into every consumer (app, widget provider)
/// rather than each building its own storage handle.
pub trait SelectionStore: Send + Sync {
    /// Currently stored identifier, or the store's default.
    fn get(&self) -> u32;

    /// Persist `id`. Once this returns `Ok`, every `get` sees `id`.
    fn set(&self, id: u32) -> Result<(), StoreError>;
}

/// Selection store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Selection store IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Selection store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file at `<dir>/<namespace>.json`.
///
/// Writes go to a uniquely named sibling temp file which is then renamed
/// over the target, so readers and concurrent writers in other processes
/// see one complete file or another, never a partial one. Keys other than
/// `selectedId` are preserved.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    dir: PathBuf,
    path: PathBuf,
    default_id: u32,
}

impl FileSelectionStore {
    /// Open (creating the directory if needed) the store for `namespace`.
    pub fn open<P: AsRef<Path>>(dir: P, namespace: &str, default_id: u32) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            path: dir.join(format!("{namespace}.json")),
            default_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self) -> u32 {
        match self.read_map() {
            Ok(map) => map
                .get(SELECTED_ID_KEY)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(self.default_id),
            Err(e) => {
                log::warn!(
                    "Unreadable selection store {}: {}",
                    self.path.display(),
                    e
                );
                self.default_id
            }
        }
    }

    fn set(&self, id: u32) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future write
        let mut map = self.read_map().unwrap_or_default();
        map.insert(SELECTED_ID_KEY.to_string(), Value::from(id));

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(&map)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        log::debug!("Stored selection {} in {}", id, self.path.display());
        Ok(())
    }
}

/// In-process store.
#[derive(Debug)]
pub struct MemorySelectionStore {
    id: AtomicU32,
}

impl MemorySelectionStore {
    pub fn new(initial: u32) -> Self {
        Self {
            id: AtomicU32::new(initial),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self) -> u32 {
        self.id.load(Ordering::SeqCst)
    }

    fn set(&self, id: u32) -> Result<(), StoreError> {
        self.id.store(id, Ordering::SeqCst);
        Ok(())
    }
}
