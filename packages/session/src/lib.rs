//! # Quill Session
//!
//! Session engine for the quill editor: owns the open document, decides
//! when to re-render the preview and when to persist edits.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editing surface: full text on every change  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: SessionController                  │
//! │  - Empty / Editing(id) state machine        │
//! │  - Debounced auto-save, flush on switch     │
//! │  - Debounced re-render                      │
//! └─────────────────────────────────────────────┘
//!          ↓                          ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ index: documents,    │  │ render: compile →    │
//! │ grouping, create     │  │ artifact, staleness  │
//! └──────────────────────┘  └──────────────────────┘
//!          ↓
//! ┌──────────────────────┐
//! │ storage: best-effort │
//! │ key-value records    │
//! └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_session::{NullEditor, SessionConfig, SessionController};
//! use quill_storage::{DocumentStore, FileMedium};
//!
//! let store = DocumentStore::new(Arc::new(FileMedium::new(data_dir)));
//! let session = SessionController::new(store, compiler, Arc::new(NullEditor), SessionConfig::default());
//!
//! let doc = session.create_document("Lecture 1", "Physics", "math");
//! session.on_editor_changed("# Lecture 1\n\n$F = ma$");
//!
//! let mut preview = session.subscribe_preview();
//! preview.changed().await?;
//! ```

mod config;
mod editor;
mod errors;
mod index;
mod session;
mod templates;

pub use config::{SessionConfig, StartupPolicy, DEFAULT_CONFIG_NAME};
pub use editor::{EditorSurface, NullEditor};
pub use errors::SessionError;
pub use index::{group_documents, DocumentIndex, FolderGroup, GroupedDocuments};
pub use session::{SessionController, SessionState};
pub use templates::{TemplateRegistry, DEFAULT_TEMPLATE};

// Re-export collaborator types for convenience
pub use quill_render::{Compiler, PreviewSnapshot, RenderArtifact, RenderResult};
pub use quill_storage::{Document, DocumentId, DocumentStore};
