use crate::tokenizer::{ends_sentence, TokenSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceResult {
    pub index: usize,
    pub exhausted: bool,
}

/// Owns the reading position within a shared token sequence.
///
/// `current_index` lives in `[0, len]`; `len` means the text is finished.
/// All moves clamp instead of failing.
#[derive(Debug, Clone, Default)]
pub struct NavigationEngine {
    tokens: TokenSequence,
    current_index: usize,
}

impl NavigationEngine {
    pub fn new(tokens: TokenSequence, start_index: usize) -> Self {
        let mut engine = Self::default();
        engine.initialize(tokens, start_index);
        engine
    }

    pub fn initialize(&mut self, tokens: TokenSequence, start_index: usize) {
        self.current_index = start_index.min(tokens.len());
        self.tokens = tokens;
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_words(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.tokens.len()
    }

    /// Pacer-driven move; may land on the terminal index.
    pub fn advance(&mut self, chunk: usize) -> AdvanceResult {
        let next = self
            .current_index
            .saturating_add(chunk)
            .min(self.tokens.len());
        self.current_index = next;
        AdvanceResult {
            index: next,
            exhausted: next == self.tokens.len(),
        }
    }

    pub fn step_back(&mut self, chunk: usize, floor: usize) {
        self.current_index = self.current_index.saturating_sub(chunk).max(floor);
    }

    /// Manual skip; stops on the last word rather than the terminal index.
    pub fn step_forward(&mut self, chunk: usize) {
        let last = self.tokens.len().saturating_sub(1);
        self.current_index = self.current_index.saturating_add(chunk).min(last);
    }

    /// Rewind to the start of the current sentence, or of the previous one
    /// when already sitting on a sentence start. Never goes below `floor`.
    pub fn seek_to_sentence_start(&mut self, floor: usize) {
        let current = self.current_index.min(self.tokens.len());
        if current <= floor || self.tokens.is_empty() {
            return;
        }

        let mut start = self.scan_back(current, floor);
        if start == current {
            start = self.scan_back(current - 1, floor);
        }
        self.current_index = start.max(floor);
    }

    // Start of the sentence containing the word before `from`.
    fn scan_back(&self, from: usize, floor: usize) -> usize {
        (floor..from)
            .rev()
            .find(|&i| ends_sentence(&self.tokens[i]))
            .map_or(floor, |i| i + 1)
    }

    pub fn current_chunk(&self, chunk: usize) -> String {
        self.tokens
            .join_range(self.current_index..self.current_index.saturating_add(chunk))
    }

    pub fn progress_fraction(&self) -> f64 {
        if self.tokens.is_empty() {
            0.0
        } else {
            self.current_index as f64 / self.tokens.len() as f64
        }
    }

    /// Text between two positions, used as the comprehension quiz source.
    pub fn passage(&self, from: usize, to: usize) -> String {
        self.tokens.join_range(from..to)
    }
}
