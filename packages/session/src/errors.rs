//! Error types for the session

use quill_storage::DocumentId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The referenced document does not exist; session state is unchanged
    #[error("Document not found: {0}")]
    NotFound(DocumentId),
}
