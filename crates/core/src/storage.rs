//! Durable key-value storage for persisted client state
//!
//! Holds the small set of values the client keeps between runs: the auth
//! token, the user id, the serialized application state and the saved event
//! identifiers. Values are stored as JSON with a metadata file carrying a
//! SHA-256 digest, so a truncated or hand-edited value is detected and
//! dropped instead of being fed back into the application.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthwatch_core::storage::{Storage, keys};
//!
//! let storage = Storage::open("/tmp/healthwatch")?;
//! storage.set(keys::AUTH_TOKEN, &"secret".to_string())?;
//!
//! if let Some(token) = storage.get::<String>(keys::AUTH_TOKEN)? {
//!     println!("token: {}", token);
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

/// Well-known storage keys
pub mod keys {
    /// Bearer token of the signed-in user
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Identifier of the signed-in user
    pub const USER_ID: &str = "user_id";
    /// Serialized application state blob
    pub const APP_STATE: &str = "app_state";
    /// Identifiers of events the user saved
    pub const SAVED_EVENTS: &str = "saved_events";
}

/// Metadata written next to every stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    /// Unix timestamp of the last write
    written_at: i64,
    /// Size of the value in bytes
    size_bytes: u64,
    /// Digest of the value for integrity
    hash: String,
}

/// File-backed storage with an in-memory read layer
pub struct Storage {
    dir: PathBuf,
    memory: RwLock<HashMap<String, Vec<u8>>>,
}

impl Storage {
    /// Open (and create if needed) a storage directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::from(e).with_context(format!("Creating storage dir {}", dir.display()))
        })?;

        Ok(Self {
            dir,
            memory: RwLock::new(HashMap::new()),
        })
    }

    /// Directory backing this storage
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a stored value
    ///
    /// Returns `Ok(None)` when the key was never written or the stored data
    /// failed its integrity check.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        {
            let guard = self
                .memory
                .read()
                .map_err(|_| Error::new(ErrorCode::Internal, "Storage lock poisoned"))?;
            if let Some(data) = guard.get(key) {
                return Ok(Some(serde_json::from_slice(data)?));
            }
        }

        let meta_path = self.meta_path(key);
        let data_path = self.data_path(key);

        if !meta_path.exists() || !data_path.exists() {
            return Ok(None);
        }

        let meta: EntryMeta = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
        let data = fs::read(&data_path)?;

        if hash_data(&data) != meta.hash {
            warn!(key, "Stored value failed integrity check, discarding");
            let _ = fs::remove_file(&meta_path);
            let _ = fs::remove_file(&data_path);
            return Ok(None);
        }

        let value: T = serde_json::from_slice(&data)?;

        if let Ok(mut guard) = self.memory.write() {
            guard.insert(key.to_string(), data);
        }

        Ok(Some(value))
    }

    /// Write a value, replacing any previous one
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;

        let meta = EntryMeta {
            written_at: chrono::Utc::now().timestamp(),
            size_bytes: data.len() as u64,
            hash: hash_data(&data),
        };

        // Data first, so a crash between the writes leaves a mismatched digest
        fs::write(self.data_path(key), &data)?;
        fs::write(self.meta_path(key), serde_json::to_string(&meta)?)?;

        if let Ok(mut guard) = self.memory.write() {
            guard.insert(key.to_string(), data);
        }

        Ok(())
    }

    /// Remove a value, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        if let Ok(mut guard) = self.memory.write() {
            guard.remove(key);
        }

        let existed = remove_if_present(&self.meta_path(key))?;
        remove_if_present(&self.data_path(key))?;

        Ok(existed)
    }

    /// Remove every stored value
    pub fn clear(&self) -> Result<()> {
        if let Ok(mut guard) = self.memory.write() {
            guard.clear();
        }

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path
                .extension()
                .is_some_and(|e| e == "meta" || e == "json")
            {
                remove_if_present(&path)?;
            }
        }

        Ok(())
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.meta", file_stem(key)))
    }

    fn data_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Delete a file; a file that is already gone is not an error
fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Keys are plain identifiers; anything else is hashed into a safe file name
fn file_stem(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        key.to_string()
    } else {
        hash_data(key.as_bytes())
    }
}

fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_set_and_get() {
        let (storage, _temp) = test_storage();

        storage.set(keys::AUTH_TOKEN, &"token-123".to_string()).unwrap();
        let value: Option<String> = storage.get(keys::AUTH_TOKEN).unwrap();

        assert_eq!(value, Some("token-123".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let (storage, _temp) = test_storage();

        let value: Option<String> = storage.get(keys::USER_ID).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Storage::open(temp_dir.path()).unwrap();
            storage
                .set(keys::SAVED_EVENTS, &vec!["a1".to_string(), "b2".to_string()])
                .unwrap();
        }

        let reopened = Storage::open(temp_dir.path()).unwrap();
        let saved: Vec<String> = reopened.get(keys::SAVED_EVENTS).unwrap().unwrap();
        assert_eq!(saved, vec!["a1", "b2"]);
    }

    #[test]
    fn test_tampered_value_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Storage::open(temp_dir.path()).unwrap();
            storage.set(keys::USER_ID, &"user-1".to_string()).unwrap();
        }

        fs::write(temp_dir.path().join("user_id.json"), "\"user-2\"").unwrap();

        let reopened = Storage::open(temp_dir.path()).unwrap();
        let value: Option<String> = reopened.get(keys::USER_ID).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let (storage, _temp) = test_storage();

        storage.set(keys::AUTH_TOKEN, &"t".to_string()).unwrap();
        storage.set(keys::USER_ID, &"u".to_string()).unwrap();

        assert!(storage.remove(keys::AUTH_TOKEN).unwrap());
        assert!(!storage.remove(keys::AUTH_TOKEN).unwrap());
        assert!(storage.get::<String>(keys::AUTH_TOKEN).unwrap().is_none());

        storage.clear().unwrap();
        assert!(storage.get::<String>(keys::USER_ID).unwrap().is_none());
    }

    #[test]
    fn test_failed_delete_is_reported() {
        let (storage, temp) = test_storage();
        storage.set(keys::AUTH_TOKEN, &"t".to_string()).unwrap();

        // A directory in place of the data file cannot be unlinked
        let data = temp.path().join("auth_token.json");
        fs::remove_file(&data).unwrap();
        fs::create_dir(&data).unwrap();

        assert!(storage.remove(keys::AUTH_TOKEN).is_err());
        assert!(storage.clear().is_err());
    }

    #[test]
    fn test_odd_keys_are_hashed() {
        assert_eq!(file_stem("app_state"), "app_state");
        assert_eq!(file_stem("../escape").len(), 64);
    }
}
