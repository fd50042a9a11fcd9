use crate::error::DocumentError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pre-extracted document text plus the title shown in session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
}

pub trait DocumentSource {
    fn get_text(&self, document_id: &str) -> Result<Document, DocumentError>;
}

/// Reads plain-text files; the document id is the file path.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentSource;

impl FileDocumentSource {
    /// Stable id for a path: canonical when the file exists.
    pub fn document_id(path: &Path) -> String {
        fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    }
}

impl DocumentSource for FileDocumentSource {
    fn get_text(&self, document_id: &str) -> Result<Document, DocumentError> {
        let path = PathBuf::from(document_id);
        if !path.is_file() {
            return Err(DocumentError::NotFound(document_id.to_string()));
        }
        let text = fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            id: document_id.to_string(),
            source,
        })?;
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| document_id.to_string());
        info!(path = %path.display(), bytes = text.len(), "loaded plain text document");
        Ok(Document {
            id: document_id.to_string(),
            title,
            text,
        })
    }
}

/// Fixed set of documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentSource {
    documents: HashMap<String, Document>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, id: &str, title: &str, text: &str) -> Self {
        self.documents.insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                title: title.to_string(),
                text: text.to_string(),
            },
        );
        self
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn get_text(&self, document_id: &str) -> Result<Document, DocumentError> {
        self.documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_file_source_reads_text_and_title() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chapter-one.txt");
        fs::write(&path, "It was a dark night.").unwrap();

        let id = FileDocumentSource::document_id(&path);
        let doc = FileDocumentSource.get_text(&id).unwrap();
        assert_eq!(doc.title, "chapter-one");
        assert_eq!(doc.text, "It was a dark night.");
        assert_eq!(doc.id, id);
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert_matches!(
            FileDocumentSource.get_text(&missing.to_string_lossy()),
            Err(DocumentError::NotFound(_))
        );
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryDocumentSource::new().with_document("d1", "Title", "some text");
        assert_eq!(source.get_text("d1").unwrap().title, "Title");
        assert_matches!(source.get_text("d2"), Err(DocumentError::NotFound(id)) if id == "d2");
    }
}
