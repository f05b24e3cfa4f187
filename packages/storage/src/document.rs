//! # Document Record
//!
//! A Document is a named, optionally-foldered unit of source text. Its `id`
//! never changes after creation; `content` is the only field rewritten by
//! auto-save.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque unique document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id: creation time in milliseconds plus a random suffix.
    ///
    /// Two ids generated in the same millisecond still differ in the random
    /// part, which is enough for a single-user local namespace.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{:x}-{}", millis, &random[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Persisted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Flat grouping label; blank means ungrouped
    #[serde(default, deserialize_with = "null_as_empty")]
    pub folder: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

impl Document {
    /// Create a document with a freshly generated id
    pub fn new(name: impl Into<String>, folder: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: DocumentId::generate(),
            name: name.into(),
            folder: folder.into(),
            content: content.into(),
        }
    }

    /// Whether this document sits outside every folder group
    pub fn is_ungrouped(&self) -> bool {
        self.folder.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<DocumentId> = (0..1000).map(|_| DocumentId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let doc: Document = serde_json::from_str(r#"{"id": "a1", "name": "Intro"}"#).unwrap();

        assert_eq!(doc.id, DocumentId::from("a1"));
        assert_eq!(doc.name, "Intro");
        assert_eq!(doc.folder, "");
        assert_eq!(doc.content, "");
        assert!(doc.is_ungrouped());
    }

    #[test]
    fn test_null_folder_is_empty() {
        let doc: Document =
            serde_json::from_str(r#"{"id": "a1", "name": "x", "folder": null, "content": "hi"}"#)
                .unwrap();

        assert_eq!(doc.folder, "");
        assert_eq!(doc.content, "hi");
    }

    #[test]
    fn test_whitespace_folder_is_ungrouped() {
        let doc = Document::new("x", "   ", "");
        assert!(doc.is_ungrouped());

        let doc = Document::new("x", "Notes", "");
        assert!(!doc.is_ungrouped());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let doc = Document {
            id: DocumentId::from("abc"),
            name: "n".to_string(),
            folder: String::new(),
            content: String::new(),
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], "abc");
    }
}
