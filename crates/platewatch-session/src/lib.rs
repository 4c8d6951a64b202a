#![warn(missing_docs)]
//! # platewatch-session
//!
//! ## Purpose
//! Owns the persisted client state: the session record and the small set of
//! keys the client keeps between invocations.
//!
//! ## Responsibilities
//! - Define the [`ClientStorage`] key/value capability.
//! - Provide in-memory and JSON-file implementations.
//! - Expose [`SessionContext`] with explicit load/save/clear operations.
//!
//! ## Data flow
//! Login writes a [`Session`] through [`SessionContext::save`]. Every guarded
//! action re-reads it with [`SessionContext::load`]; nothing is cached in
//! memory between reads.
//!
//! ## Ownership and lifetimes
//! Controllers share one `Arc<dyn ClientStorage>`. Implementations use
//! interior mutability so reads and writes take `&self`.
//!
//! ## Error model
//! I/O and codec failures surface as [`StorageError`].
//!
//! ## Security and privacy notes
//! Token values are never logged. The file store writes with a temp file and
//! rename so a crash cannot leave a half-written session.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use platewatch_session::{MemoryStorage, SessionContext};
//!
//! let context = SessionContext::new(Arc::new(MemoryStorage::new()));
//! assert!(context.load().unwrap().is_none());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use platewatch_core::{Session, User, normalize_plate};
use thiserror::Error;
use tracing::debug;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-encoded [`User`].
pub const USER_KEY: &str = "user";
/// Key holding the plate selected for the next complaint.
pub const PENDING_PLATE_KEY: &str = "current_complaint_plate";
/// Key holding the local-mode registered account.
pub const REGISTERED_USER_KEY: &str = "registered_user";
/// Key holding the local-mode complaint list.
pub const COMPLAINTS_KEY: &str = "complaints";

/// Persisted string key/value store.
pub trait ClientStorage: Send + Sync {
    /// Reads one key.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes one key.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes one key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Volatile storage used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Storage persisted as one JSON object of key -> string.
///
/// Every operation re-reads the file, so separate processes observe each
/// other's writes the way separate page loads do.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(error) => return Err(StorageError::Io(error)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(StorageError::Codec)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn mutate(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_all()?;
        apply(&mut entries);
        self.write_all(&entries)
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

/// Explicit session context handed to every controller.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn ClientStorage>,
}

impl SessionContext {
    /// Wraps a storage backend.
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage handle.
    pub fn storage(&self) -> Arc<dyn ClientStorage> {
        Arc::clone(&self.storage)
    }

    /// Returns the stored bearer token, if any.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    /// Returns the stored user profile, if any.
    ///
    /// # Errors
    /// Returns [`StorageError::Codec`] when the stored profile is not valid
    /// JSON.
    pub fn user(&self) -> Result<Option<User>, StorageError> {
        match self.storage.get(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Loads the full session. Returns `None` unless both token and user are
    /// present.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        let Some(user) = self.user()? else {
            return Ok(None);
        };
        Ok(Some(Session { token, user }))
    }

    /// Persists a session after login.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &user)?;
        debug!(role = ?session.user.role, "session saved");
        Ok(())
    }

    /// Destroys the persisted session.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    /// Stores the plate selected for the next complaint, normalized.
    pub fn set_pending_plate(&self, plate: &str) -> Result<(), StorageError> {
        self.storage.set(PENDING_PLATE_KEY, &normalize_plate(plate))
    }

    /// Returns the plate selected for the next complaint.
    pub fn pending_plate(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(PENDING_PLATE_KEY)?
            .filter(|plate| !plate.is_empty()))
    }

    /// Forgets the pending plate.
    pub fn clear_pending_plate(&self) -> Result<(), StorageError> {
        self.storage.remove(PENDING_PLATE_KEY)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file operation failed.
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Stored value is not valid JSON for its key.
    #[error("storage codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// A previous holder panicked while mutating the store.
    #[error("storage lock poisoned")]
    Poisoned,
}
