//! # Quill Storage
//!
//! Best-effort local persistence for quill documents.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ DocumentStore: documents + current id       │
//! │  - load() never fails                       │
//! │  - save failures are reported, not fatal    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ KeyValueMedium: synchronous string records  │
//! │  - MemoryMedium (size-limited)              │
//! │  - FileMedium (one file per key)            │
//! └─────────────────────────────────────────────┘
//! ```

mod document;
mod error;
mod medium;
mod store;

pub use document::{Document, DocumentId};
pub use error::{MediumError, StoreError};
pub use medium::{FileMedium, KeyValueMedium, MemoryMedium};
pub use store::{DocumentStore, StorageKeys, StoredState};
