use std::ops::{Deref, Range};
use std::sync::Arc;

use itertools::Itertools;

/// Immutable word list for one loaded document.
///
/// Cloning is cheap: every clone points at the same backing slice, so the
/// navigator, the session and any observer can hold the sequence without
/// copying words around.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenSequence {
    words: Arc<[String]>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    /// Join the words in `range` with single spaces, clamping both ends to
    /// the sequence bounds.
    pub fn join_range(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.words[start..end].iter().join(" ")
    }
}

impl Deref for TokenSequence {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.words
    }
}

impl From<Vec<String>> for TokenSequence {
    fn from(words: Vec<String>) -> Self {
        Self {
            words: words.into(),
        }
    }
}

/// Split `text` on runs of whitespace, dropping empty pieces.
pub fn tokenize(text: &str) -> TokenSequence {
    text.split_whitespace()
        .map(str::to_owned)
        .collect::<Vec<_>>()
        .into()
}

/// True when the word closes a sentence (`.`, `!` or `?`).
pub fn ends_sentence(word: &str) -> bool {
    word.ends_with(['.', '!', '?'])
}
