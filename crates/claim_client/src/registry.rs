//! Ordered set of document entries attached to a claim.

use std::{path::Path, sync::Arc};

use shared::domain::{is_accepted_extension, DocumentId, DocumentType};
use tracing::debug;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file the user picked for a document entry. The bytes are shared so
/// snapshots taken for submission never copy or mutate the registry's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string());
        Self {
            name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn has_accepted_extension(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_accepted_extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub id: DocumentId,
    pub kind: DocumentType,
    pub file: Option<DocumentFile>,
}

/// Entries keep insertion order. Ids come from a counter that only moves
/// forward, so a removed id is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    entries: Vec<DocumentEntry>,
    next_id: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        self.entries.push(DocumentEntry {
            id,
            kind: DocumentType::default(),
            file: None,
        });
        debug!(document_id = %id, "document entry added");
        id
    }

    /// Returns `false` when the id is unknown, which is not an error: the
    /// entry may already be gone by the time a stale view asks to remove it.
    pub fn remove(&mut self, id: DocumentId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(document_id = %id, "document entry removed");
        }
        removed
    }

    pub fn set_type(&mut self, id: DocumentId, kind: DocumentType) -> bool {
        let Some(entry) = self.get_mut(id) else {
            return false;
        };
        entry.kind = kind;
        debug!(document_id = %id, document_type = %kind, "document type updated");
        true
    }

    /// Like [`set_type`](Self::set_type) for raw form input; unknown type
    /// names leave the entry untouched.
    pub fn set_type_raw(&mut self, id: DocumentId, raw: &str) -> bool {
        match raw.parse::<DocumentType>() {
            Ok(kind) => self.set_type(id, kind),
            Err(err) => {
                debug!(document_id = %id, "ignoring document type update: {err}");
                false
            }
        }
    }

    /// A cancelled file picker yields `None`, which keeps the previous file.
    pub fn set_file(&mut self, id: DocumentId, file: Option<DocumentFile>) -> bool {
        let Some(file) = file else {
            return false;
        };
        let Some(entry) = self.get_mut(id) else {
            return false;
        };
        debug!(document_id = %id, filename = file.name(), "document file attached");
        entry.file = Some(file);
        true
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn get_mut(&mut self, id: DocumentId) -> Option<&mut DocumentEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    /// Entries that have a file and will therefore be submitted.
    pub fn attached(&self) -> impl Iterator<Item = (&DocumentEntry, &DocumentFile)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.file.as_ref().map(|file| (entry, file)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
