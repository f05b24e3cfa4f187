//! # Document Index
//!
//! In-memory document collection in store order. Every mutation is written
//! through to the [`DocumentStore`]; a failed write is logged and otherwise
//! ignored, so reads always reflect the in-memory state.

use quill_storage::{Document, DocumentId, DocumentStore};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Documents partitioned for the file tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedDocuments {
    /// Documents with a blank folder, in store order
    pub ungrouped: Vec<Document>,
    /// Folder buckets sorted by name
    pub folders: Vec<FolderGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderGroup {
    pub name: String,
    /// Documents in store order
    pub documents: Vec<Document>,
}

/// Group documents by exact folder label.
///
/// Blank or whitespace-only folders are ungrouped. Buckets are sorted
/// lexicographically; order within a bucket is preserved.
pub fn group_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> GroupedDocuments {
    let mut ungrouped = Vec::new();
    let mut buckets: BTreeMap<String, Vec<Document>> = BTreeMap::new();

    for doc in documents {
        if doc.is_ungrouped() {
            ungrouped.push(doc.clone());
        } else {
            buckets
                .entry(doc.folder.clone())
                .or_default()
                .push(doc.clone());
        }
    }

    GroupedDocuments {
        ungrouped,
        folders: buckets
            .into_iter()
            .map(|(name, documents)| FolderGroup { name, documents })
            .collect(),
    }
}

/// Document collection backed by a store
pub struct DocumentIndex {
    documents: Vec<Document>,
    store: DocumentStore,
}

impl DocumentIndex {
    /// Index over loaded documents.
    ///
    /// Ids must be unique: a later document repeating an earlier id is given a
    /// fresh one and the repaired collection is written back.
    pub fn new(store: DocumentStore, mut documents: Vec<Document>) -> Self {
        let mut seen = HashSet::with_capacity(documents.len());
        let mut repaired = 0usize;

        for doc in documents.iter_mut() {
            if seen.contains(&doc.id) {
                let duplicate = doc.id.clone();
                while seen.contains(&doc.id) {
                    doc.id = DocumentId::generate();
                }
                tracing::warn!(duplicate = %duplicate, id = %doc.id, name = %doc.name, "Duplicate document id, assigned a new one");
                repaired += 1;
            }
            seen.insert(doc.id.clone());
        }

        let index = Self { documents, store };
        if repaired > 0 {
            index.persist();
        }
        index
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Documents in store order
    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn find(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| &doc.id == id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Append a new document with a fresh id and persist the collection
    pub fn create(
        &mut self,
        name: impl Into<String>,
        folder: impl Into<String>,
        content: impl Into<String>,
    ) -> Document {
        let mut doc = Document::new(name, folder, content);
        while self.contains(&doc.id) {
            doc.id = DocumentId::generate();
        }

        tracing::info!(id = %doc.id, name = %doc.name, folder = %doc.folder, "Created document");
        self.documents.push(doc.clone());
        self.persist();
        doc
    }

    /// Replace a document's content. Returns false (and does nothing) for unknown ids.
    pub fn update(&mut self, id: &DocumentId, content: impl Into<String>) -> bool {
        match self.documents.iter_mut().find(|doc| &doc.id == id) {
            Some(doc) => {
                doc.content = content.into();
                tracing::debug!(id = %id, bytes = doc.content.len(), "Updated document");
                self.persist();
                true
            }
            None => {
                tracing::debug!(id = %id, "Ignoring update for unknown document");
                false
            }
        }
    }

    /// Remove a document and persist the collection
    pub fn remove(&mut self, id: &DocumentId) -> Option<Document> {
        let position = self.documents.iter().position(|doc| &doc.id == id)?;
        let removed = self.documents.remove(position);

        tracing::info!(id = %id, "Removed document");
        self.persist();
        Some(removed)
    }

    /// Distinct non-blank folder labels, sorted
    pub fn folders(&self) -> Vec<String> {
        self.grouped()
            .folders
            .into_iter()
            .map(|group| group.name)
            .collect()
    }

    pub fn grouped(&self) -> GroupedDocuments {
        group_documents(&self.documents)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_all(&self.documents) {
            tracing::warn!(error = %e, "Failed to persist documents, keeping changes in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_storage::{KeyValueMedium, MemoryMedium};
    use std::sync::Arc;

    fn doc(id: &str, folder: &str) -> Document {
        Document {
            id: DocumentId::from(id),
            name: id.to_uppercase(),
            folder: folder.to_string(),
            content: String::new(),
        }
    }

    fn index_with(medium: Arc<MemoryMedium>) -> DocumentIndex {
        DocumentIndex::new(DocumentStore::new(medium), Vec::new())
    }

    #[test]
    fn test_create_then_find() {
        let medium = Arc::new(MemoryMedium::new());
        let mut index = index_with(medium.clone());

        let created = index.create("Intro", "Notes", "# Hi");
        let found = index.find(&created.id).unwrap();

        assert_eq!(found.name, "Intro");
        assert_eq!(found.folder, "Notes");
        assert_eq!(found.content, "# Hi");
        assert!(medium.get("files").unwrap().unwrap().contains("Intro"));
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let medium = Arc::new(MemoryMedium::new());
        let mut index = index_with(medium.clone());

        assert!(!index.update(&DocumentId::from("ghost"), "boo"));
        assert!(index.is_empty());
        assert!(medium.raw("files").is_none());
    }

    #[test]
    fn test_update_persists() {
        let medium = Arc::new(MemoryMedium::new());
        let mut index = index_with(medium.clone());
        let created = index.create("A", "", "old");

        assert!(index.update(&created.id, "new"));

        let reloaded = DocumentStore::new(medium).load();
        assert_eq!(reloaded.documents[0].content, "new");
    }

    #[test]
    fn test_failed_writes_are_invisible_to_reads() {
        let medium = Arc::new(MemoryMedium::with_quota(8));
        let mut index = index_with(medium.clone());

        let a = index.create("A", "Notes", "first");
        let b = index.create("B", "", "second");
        index.update(&a.id, "edited");

        assert_eq!(index.len(), 2);
        assert_eq!(index.find(&a.id).unwrap().content, "edited");
        assert_eq!(index.find(&b.id).unwrap().content, "second");
        assert_eq!(index.list()[0].id, a.id);
        assert!(medium.raw("files").is_none());
    }

    #[test]
    fn test_remove() {
        let medium = Arc::new(MemoryMedium::new());
        let mut index = index_with(medium);
        let a = index.create("A", "", "");
        let b = index.create("B", "", "");

        assert_eq!(index.remove(&a.id).map(|d| d.id), Some(a.id.clone()));
        assert!(index.remove(&a.id).is_none());
        assert_eq!(index.list().len(), 1);
        assert_eq!(index.list()[0].id, b.id);
    }

    #[test]
    fn test_grouping() {
        let documents = vec![
            doc("a", "Notes"),
            doc("b", ""),
            doc("c", "Archive"),
            doc("d", "  "),
            doc("e", "Notes"),
            doc("f", "notes"),
        ];

        let grouped = group_documents(&documents);

        let ungrouped: Vec<_> = grouped.ungrouped.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ungrouped, vec!["b", "d"]);

        let names: Vec<_> = grouped.folders.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Archive", "Notes", "notes"]);

        let notes: Vec<_> = grouped.folders[1]
            .documents
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(notes, vec!["a", "e"]);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned_on_load() {
        let medium = Arc::new(MemoryMedium::new());
        let mut first = doc("a", "");
        first.content = "first".to_string();
        let mut second = doc("a", "Notes");
        second.content = "second".to_string();

        let mut index = DocumentIndex::new(
            DocumentStore::new(medium.clone()),
            vec![first, doc("b", ""), second],
        );

        assert_eq!(index.len(), 3);
        assert_eq!(index.find(&DocumentId::from("a")).unwrap().content, "first");
        let moved = index.list()[2].id.clone();
        assert_ne!(moved, DocumentId::from("a"));
        assert_ne!(moved, DocumentId::from("b"));

        assert!(index.update(&moved, "second, edited"));
        assert_eq!(index.find(&DocumentId::from("a")).unwrap().content, "first");

        let reloaded = DocumentStore::new(medium).load();
        assert_eq!(reloaded.documents[2].id, moved);
        assert_eq!(reloaded.documents[2].content, "second, edited");
    }

    #[test]
    fn test_unique_ids_are_not_rewritten() {
        let medium = Arc::new(MemoryMedium::new());
        DocumentIndex::new(DocumentStore::new(medium.clone()), vec![doc("a", ""), doc("b", "")]);

        assert!(medium.raw("files").is_none());
    }

    #[test]
    fn test_folders() {
        let index = DocumentIndex::new(
            DocumentStore::new(Arc::new(MemoryMedium::new())),
            vec![doc("a", "Zeta"), doc("b", ""), doc("c", "Alpha"), doc("d", "Zeta")],
        );

        assert_eq!(index.folders(), vec!["Alpha".to_string(), "Zeta".to_string()]);
    }
}
