//! Gate record persistence.
//!
//! # Design Decisions
//! - Create is atomic and no-clobber: the record is written to a temp file in
//!   the same directory and linked into place only if nothing is there yet
//! - Once a record has been read it is cached; it never changes afterwards
//! - A missing file means "not configured", not an error

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::gate::token::normalize_secure_path;
use crate::gate::GateError;

/// The persisted gate: which path opens the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRecord {
    /// Secure path token, without the leading slash.
    pub entry_token: String,

    /// Creation time, seconds since the Unix epoch.
    pub created_at: u64,
}

impl GateRecord {
    fn new(entry_token: String) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { entry_token, created_at }
    }

    /// The entry path, e.g. `/portal-abc123`.
    pub fn entry_path(&self) -> String {
        format!("/{}", self.entry_token)
    }
}

/// Storage for the single gate record.
pub trait GateStore: Send + Sync {
    /// Returns the record, or `None` before setup.
    fn load(&self) -> Result<Option<GateRecord>, GateError>;

    /// Validates `secure_path` and creates the record.
    ///
    /// Fails with [`GateError::AlreadyConfigured`] if a record exists.
    fn create(&self, secure_path: &str) -> Result<GateRecord, GateError>;
}

/// TOML file on disk.
#[derive(Debug)]
pub struct FileGateStore {
    path: PathBuf,
    cached: OnceLock<GateRecord>,
}

impl FileGateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<GateRecord>, GateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: GateRecord = toml::from_str(&content)?;
        if record.entry_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

impl GateStore for FileGateStore {
    fn load(&self) -> Result<Option<GateRecord>, GateError> {
        if let Some(record) = self.cached.get() {
            return Ok(Some(record.clone()));
        }
        let record = self.read()?;
        if let Some(record) = &record {
            let _ = self.cached.set(record.clone());
        }
        Ok(record)
    }

    fn create(&self, secure_path: &str) -> Result<GateRecord, GateError> {
        let record = GateRecord::new(normalize_secure_path(secure_path)?);
        let encoded = toml::to_string(&record)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(encoded.as_bytes())?;
        staged.as_file().sync_all()?;

        staged.persist_noclobber(&self.path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                GateError::AlreadyConfigured
            } else {
                GateError::Io(e.error)
            }
        })?;

        tracing::info!(path = %self.path.display(), "Gate record created");
        let _ = self.cached.set(record.clone());
        Ok(record)
    }
}

/// In-process store, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryGateStore {
    record: RwLock<Option<GateRecord>>,
}

impl MemoryGateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that is already configured with `secure_path`.
    pub fn with_secure_path(secure_path: &str) -> Result<Self, GateError> {
        let store = Self::new();
        store.create(secure_path)?;
        Ok(store)
    }
}

impl GateStore for MemoryGateStore {
    fn load(&self) -> Result<Option<GateRecord>, GateError> {
        Ok(self.record.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn create(&self, secure_path: &str) -> Result<GateRecord, GateError> {
        let token = normalize_secure_path(secure_path)?;
        let mut slot = self.record.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(GateError::AlreadyConfigured);
        }
        let record = GateRecord::new(token);
        *slot = Some(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileGateStore::new(dir.path().join("gate.toml"));

        assert_eq!(store.load().unwrap(), None);
        let created = store.create(" Portal-ABC123 ").unwrap();
        assert_eq!(created.entry_token, "portal-abc123");
        assert_eq!(created.entry_path(), "/portal-abc123");

        let reopened = FileGateStore::new(dir.path().join("gate.toml"));
        assert_eq!(reopened.load().unwrap(), Some(created));
    }

    #[test]
    fn file_store_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gate.toml");
        FileGateStore::new(&path).create("first-path").unwrap();

        let other = FileGateStore::new(&path);
        assert!(matches!(other.create("second-path"), Err(GateError::AlreadyConfigured)));
        assert_eq!(other.load().unwrap().unwrap().entry_token, "first-path");
    }

    #[test]
    fn invalid_path_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileGateStore::new(dir.path().join("gate.toml"));
        assert!(matches!(store.create("bad"), Err(GateError::InvalidSecurePath)));
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_and_empty_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gate.toml");

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(FileGateStore::new(&path).load(), Err(GateError::Corrupt(_))));

        std::fs::write(&path, "entry_token = \"\"\ncreated_at = 0\n").unwrap();
        assert_eq!(FileGateStore::new(&path).load().unwrap(), None);
    }

    #[test]
    fn memory_store_creates_once() {
        let store = MemoryGateStore::new();
        assert!(store.load().unwrap().is_none());
        store.create("portal-abc123").unwrap();
        assert!(matches!(store.create("portal-xyz789"), Err(GateError::AlreadyConfigured)));
        assert_eq!(store.load().unwrap().unwrap().entry_token, "portal-abc123");
    }
}
