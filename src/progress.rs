use crate::error::StoreError;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// Boundary for persisting the last-read word of each document.
///
/// The session saves on every pause (never per tick) and treats any failure
/// as reportable but non-fatal: reading continues either way.
pub trait ProgressStore {
    fn save(&self, document_id: &str, word_index: usize) -> Result<(), StoreError>;
    fn load(&self, document_id: &str) -> Result<Option<usize>, StoreError>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for Rc<T> {
    fn save(&self, document_id: &str, word_index: usize) -> Result<(), StoreError> {
        (**self).save(document_id, word_index)
    }

    fn load(&self, document_id: &str) -> Result<Option<usize>, StoreError> {
        (**self).load(document_id)
    }
}

/// A saved index of 0 means the same as no saved progress.
pub fn has_resume_point(saved_index: Option<usize>) -> bool {
    saved_index.is_some_and(|idx| idx > 0)
}

/// Process-local store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    entries: Arc<Mutex<HashMap<String, usize>>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save seen so far, for inspection by hosts and tests.
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn save(&self, document_id: &str, word_index: usize) -> Result<(), StoreError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(document_id.to_string(), word_index);
        }
        Ok(())
    }

    fn load(&self, document_id: &str) -> Result<Option<usize>, StoreError> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(document_id).copied()))
    }
}
