//! # Document Store
//!
//! Persists the document collection and the id of the last-open document as
//! two records on a [`KeyValueMedium`].
//!
//! Loading never fails: an unreadable or corrupted record is treated as a
//! first run. Saving reports failures as [`StoreError`] but never panics.

use crate::document::{Document, DocumentId};
use crate::error::StoreError;
use crate::medium::KeyValueMedium;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Record names on the medium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageKeys {
    pub files: String,
    pub current_id: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            files: "files".to_string(),
            current_id: "currentId".to_string(),
        }
    }
}

/// Everything the store knows at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredState {
    pub documents: Vec<Document>,
    pub current_id: Option<DocumentId>,
}

/// Best-effort persistence of documents and the current id
#[derive(Clone)]
pub struct DocumentStore {
    medium: Arc<dyn KeyValueMedium>,
    keys: StorageKeys,
}

impl DocumentStore {
    pub fn new(medium: Arc<dyn KeyValueMedium>) -> Self {
        Self::with_keys(medium, StorageKeys::default())
    }

    pub fn with_keys(medium: Arc<dyn KeyValueMedium>, keys: StorageKeys) -> Self {
        Self { medium, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Same medium, different record names
    pub fn rekeyed(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Load persisted state, substituting "first run" for anything unreadable
    pub fn load(&self) -> StoredState {
        let documents = match self.medium.get(&self.keys.files) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Document>>(&raw) {
                Ok(documents) => documents,
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted documents are corrupted, starting empty");
                    return StoredState::default();
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted documents, starting empty");
                return StoredState::default();
            }
        };

        let current_id = match self.medium.get(&self.keys.current_id) {
            Ok(Some(raw)) => match serde_json::from_str::<Option<DocumentId>>(&raw) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted current id is corrupted, ignoring it");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted current id");
                None
            }
        };

        tracing::debug!(
            documents = documents.len(),
            current = ?current_id,
            "Loaded persisted state"
        );

        StoredState {
            documents,
            current_id,
        }
    }

    /// Replace the persisted document collection
    pub fn save_all(&self, documents: &[Document]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(documents)?;
        self.medium.set(&self.keys.files, &raw)?;
        Ok(())
    }

    /// Persist the current document id (`None` stores an explicit null)
    pub fn save_current_id(&self, id: Option<&DocumentId>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&id)?;
        self.medium.set(&self.keys.current_id, &raw)?;
        Ok(())
    }
}
