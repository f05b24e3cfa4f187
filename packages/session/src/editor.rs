//! Editing surface seam

/// The text widget the session drives.
///
/// The surface reports edits by calling
/// [`SessionController::on_editor_changed`](crate::SessionController::on_editor_changed)
/// with the full text; the controller replaces its text when a document is
/// loaded. Implementations may echo `set_text` back as a change event.
pub trait EditorSurface: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Surface that discards every command (headless sessions)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEditor;

impl EditorSurface for NullEditor {
    fn set_text(&self, _text: &str) {}
}
