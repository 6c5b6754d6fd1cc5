//! Storage for generated documents.
//!
//! A store keeps rendered `local.conf` text under a random id so a result can
//! be shared and fetched later. Records are never updated in place.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failures of a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

/// One saved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub uuid: String,
    /// Unix seconds at save time.
    pub timestamp: i64,
    pub text: String,
}

impl StoredConfig {
    fn new(id: Uuid, text: &str) -> Self {
        Self {
            uuid: id.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            text: text.to_string(),
        }
    }
}

/// Save text under a fresh id and load it back.
pub trait BlobStore: Send + Sync {
    /// Store `text`, returning its id.
    fn save(&self, text: &str) -> Result<String, StoreError>;

    /// Fetch the text saved under `id`, `None` when unknown.
    fn load(&self, id: &str) -> Result<Option<String>, StoreError>;
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoredConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryStore {
    fn save(&self, text: &str) -> Result<String, StoreError> {
        let record = StoredConfig::new(Uuid::new_v4(), text);
        let id = record.uuid.clone();
        self.records
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(id.clone(), record);
        debug!("Saved config {id} in memory");
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(id).map(|r| r.text.clone()))
    }
}

/// One JSON document per record in a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Use `dir`, creating it when missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        info!("Storing configs in {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl BlobStore for DirStore {
    fn save(&self, text: &str) -> Result<String, StoreError> {
        let id = Uuid::new_v4();
        let record = StoredConfig::new(id, text);
        let path = self.record_path(&id);
        let content = serde_json::to_string_pretty(&record).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Saved config {} to {}", record.uuid, path.display());
        Ok(record.uuid)
    }

    fn load(&self, id: &str) -> Result<Option<String>, StoreError> {
        // Only well-formed ids map to file names.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let path = self.record_path(&id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let record: StoredConfig =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt { path, source })?;
        Ok(Some(record.text))
    }
}
