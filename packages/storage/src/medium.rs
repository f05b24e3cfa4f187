//! # Key-Value Media
//!
//! Synchronous string storage behind the document store. Implementations
//! may refuse writes (quota, unavailable medium); the store turns those into
//! non-fatal errors.

use crate::error::MediumError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Synchronous, possibly size-limited key-value storage
pub trait KeyValueMedium: Send + Sync {
    /// Read a record; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, MediumError>;

    /// Write a record, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), MediumError>;

    /// Delete a record; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), MediumError>;
}

/// In-memory medium with an optional byte quota
pub struct MemoryMedium {
    quota: Option<usize>,
    state: Mutex<MemoryState>,
}

struct MemoryState {
    entries: HashMap<String, String>,
    available: bool,
}

impl MemoryMedium {
    /// Unlimited medium
    pub fn new() -> Self {
        Self {
            quota: None,
            state: Mutex::new(MemoryState {
                entries: HashMap::new(),
                available: true,
            }),
        }
    }

    /// Medium that rejects writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::new()
        }
    }

    /// Simulate the medium going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Raw record, bypassing availability (for inspection in tests)
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        let state = self.lock();
        if !state.available {
            return Err(MediumError::Unavailable("memory medium disabled".to_string()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        let mut state = self.lock();
        if !state.available {
            return Err(MediumError::Unavailable("memory medium disabled".to_string()));
        }

        if let Some(limit) = self.quota {
            let others: usize = state
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(MediumError::QuotaExceeded { needed, limit });
            }
        }

        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        let mut state = self.lock();
        if !state.available {
            return Err(MediumError::Unavailable("memory medium disabled".to_string()));
        }
        state.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed medium: one `<key>.json` file per record
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
