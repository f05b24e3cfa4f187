//! # Session Controller
//!
//! Owns "which document is open" and reconciles it with the preview and with
//! persistence.
//!
//! ```text
//!            open / create                    edit
//!   Empty ─────────────────→ Editing(id) ─────────────┐
//!     ↑                          │  ↑                 │ schedule_render (450 ms)
//!     └──── delete current ──────┘  └─────────────────┘ auto-save       (1000 ms)
//! ```
//!
//! Switching documents flushes the outgoing document's pending auto-save
//! before the incoming one is loaded, so no committed edit is lost even if
//! the debounce had not fired yet.
//!
//! The controller spawns its renders and timers on the ambient tokio runtime.
//! `new`, `open_document`, `create_document` and `on_editor_changed` panic
//! when called outside one.
//!
//! Lock order is session context, then pipeline, then timers. The current
//! document, its pending save and the render subject change under one
//! context lock; only the editor surface is called with it released.

use crate::config::{SessionConfig, StartupPolicy};
use crate::editor::EditorSurface;
use crate::errors::SessionError;
use crate::index::{DocumentIndex, GroupedDocuments};
use crate::templates::TemplateRegistry;
use quill_common::DebounceTimer;
use quill_render::{Compiler, PreviewSnapshot, RenderPipeline, RenderResult};
use quill_storage::{Document, DocumentId, DocumentStore};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No current document
    Empty,
    Editing(DocumentId),
}

/// Mutable session state shared with the auto-save callback
struct SessionContext {
    index: DocumentIndex,
    current: Option<DocumentId>,
    /// Last editor snapshot not yet written to the index
    pending_save: Option<PendingSave>,
}

struct PendingSave {
    document_id: DocumentId,
    source: String,
}

impl SessionContext {
    fn flush_pending(&mut self) -> bool {
        match self.pending_save.take() {
            Some(pending) => {
                if !self.index.update(&pending.document_id, pending.source) {
                    tracing::debug!(id = %pending.document_id, "Dropped pending save for missing document");
                }
                true
            }
            None => false,
        }
    }

    fn persist_current(&self) {
        if let Err(e) = self.index.store().save_current_id(self.current.as_ref()) {
            tracing::warn!(error = %e, "Failed to persist current document id");
        }
    }
}

/// Coordinates the current document, auto-save and the live preview
pub struct SessionController {
    context: Arc<Mutex<SessionContext>>,
    pipeline: RenderPipeline,
    autosave: DebounceTimer,
    editor: Arc<dyn EditorSurface>,
    templates: TemplateRegistry,
    config: SessionConfig,
}

impl SessionController {
    /// Load persisted state and restore the last-open document.
    ///
    /// Records are read and written under `config.storage_keys`, whatever
    /// keys `store` was built with.
    pub fn new(
        store: DocumentStore,
        compiler: Arc<dyn Compiler>,
        editor: Arc<dyn EditorSurface>,
        config: SessionConfig,
    ) -> Self {
        let store = store.rekeyed(config.storage_keys.clone());
        let stored = store.load();
        let index = DocumentIndex::new(store, stored.documents);

        let pipeline = RenderPipeline::new(
            compiler,
            Arc::new(config.resources.clone()),
            config.render_debounce(),
        );

        let controller = Self {
            context: Arc::new(Mutex::new(SessionContext {
                index,
                current: None,
                pending_save: None,
            })),
            pipeline,
            autosave: DebounceTimer::new(config.autosave_debounce()),
            editor,
            templates: TemplateRegistry::builtin(),
            config,
        };

        controller.restore(stored.current_id);
        controller
    }

    fn restore(&self, persisted: Option<DocumentId>) {
        if let Some(id) = persisted {
            match self.activate(&id) {
                Ok(()) => return,
                Err(_) => tracing::debug!(id = %id, "Persisted current document no longer exists"),
            }
        }

        match &self.config.startup {
            StartupPolicy::RestoreOrEmpty => {
                tracing::debug!("No document to restore, session is empty");
            }
            StartupPolicy::RestoreOrCreate {
                name,
                folder,
                template,
            } => {
                let first = self.lock().index.list().first().map(|doc| doc.id.clone());
                match first {
                    Some(id) => {
                        if let Err(e) = self.activate(&id) {
                            tracing::warn!(error = %e, "Failed to open first document");
                        }
                    }
                    None => {
                        self.create_document(name.clone(), folder.clone(), template);
                    }
                }
            }
        }
    }

    /// Switch to `id`, flushing the outgoing document's pending edit first.
    ///
    /// Unknown ids return [`SessionError::NotFound`] and leave the session
    /// untouched.
    pub fn open_document(&self, id: &DocumentId) -> Result<(), SessionError> {
        {
            let mut ctx = self.lock();
            if !ctx.index.contains(id) {
                tracing::debug!(id = %id, "Ignoring open for unknown document");
                return Err(SessionError::NotFound(id.clone()));
            }
            self.autosave.clear();
            ctx.flush_pending();
        }

        self.activate(id)
    }

    /// Create a document from a template and open it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create_document(
        &self,
        name: impl Into<String>,
        folder: impl Into<String>,
        template_key: &str,
    ) -> Document {
        let content = self.templates.resolve(template_key);
        let document = self.lock().index.create(name, folder, content);

        if let Err(e) = self.open_document(&document.id) {
            tracing::warn!(error = %e, "Failed to open newly created document");
        }
        document
    }

    /// Editor change event carrying the full current text.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_editor_changed(&self, source: impl Into<String>) {
        let source = source.into();

        let mut ctx = self.lock();
        let Some(document_id) = ctx.current.clone() else {
            tracing::debug!("Ignoring editor change with no open document");
            return;
        };
        ctx.pending_save = Some(PendingSave {
            document_id,
            source: source.clone(),
        });

        // Render subject and pending save must name the same document
        self.pipeline.schedule_render(source);

        let context = self.context.clone();
        self.autosave.reset(move || {
            lock_context(&context).flush_pending();
        });
    }

    /// Persist the pending edit now. Returns whether there was one.
    pub fn flush(&self) -> bool {
        self.autosave.clear();
        self.lock().flush_pending()
    }

    /// Delete a document. Deleting the current document empties the session.
    pub fn delete_document(&self, id: &DocumentId) -> Result<Document, SessionError> {
        let (removed, was_current) = {
            let mut ctx = self.lock();
            let removed = ctx
                .index
                .remove(id)
                .ok_or_else(|| SessionError::NotFound(id.clone()))?;

            if ctx.pending_save.as_ref().map(|p| &p.document_id) == Some(id) {
                ctx.pending_save = None;
            }

            let was_current = ctx.current.as_ref() == Some(id);
            if was_current {
                ctx.current = None;
                ctx.persist_current();
                self.autosave.clear();
                self.pipeline.retarget(None);
            }
            (removed, was_current)
        };

        if was_current {
            self.editor.set_text("");
            tracing::info!(id = %id, "Deleted current document, session is empty");
        }
        Ok(removed)
    }

    /// Make `id` current: render it immediately and load it into the editor
    fn activate(&self, id: &DocumentId) -> Result<(), SessionError> {
        let content = {
            let mut ctx = self.lock();
            let content = ctx
                .index
                .find(id)
                .map(|doc| doc.content.clone())
                .ok_or_else(|| SessionError::NotFound(id.clone()))?;
            ctx.current = Some(id.clone());
            ctx.persist_current();

            self.pipeline.retarget(Some(id.to_string()));
            self.pipeline.render_now(content.clone());
            content
        };

        tracing::info!(id = %id, "Opened document");
        self.editor.set_text(&content);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        match &self.lock().current {
            Some(id) => SessionState::Editing(id.clone()),
            None => SessionState::Empty,
        }
    }

    pub fn current_id(&self) -> Option<DocumentId> {
        self.lock().current.clone()
    }

    /// The current document as last written to the index
    pub fn current_document(&self) -> Option<Document> {
        let ctx = self.lock();
        let id = ctx.current.as_ref()?;
        ctx.index.find(id).cloned()
    }

    pub fn find(&self, id: &DocumentId) -> Option<Document> {
        self.lock().index.find(id).cloned()
    }

    /// Documents in store order
    pub fn documents(&self) -> Vec<Document> {
        self.lock().index.list().to_vec()
    }

    pub fn grouped_documents(&self) -> GroupedDocuments {
        self.lock().index.grouped()
    }

    pub fn folders(&self) -> Vec<String> {
        self.lock().index.folders()
    }

    /// Whether an edit is waiting to be auto-saved
    pub fn has_pending_save(&self) -> bool {
        self.lock().pending_save.is_some()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Latest render result for the current document
    pub fn render_result(&self) -> Option<RenderResult> {
        self.pipeline.latest()
    }

    pub fn preview(&self) -> PreviewSnapshot {
        self.pipeline.snapshot()
    }

    pub fn subscribe_preview(&self) -> watch::Receiver<PreviewSnapshot> {
        self.pipeline.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, SessionContext> {
        lock_context(&self.context)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.flush() {
            tracing::debug!("Flushed pending edit on shutdown");
        }
    }
}

fn lock_context(context: &Mutex<SessionContext>) -> MutexGuard<'_, SessionContext> {
    context.lock().unwrap_or_else(|e| e.into_inner())
}
