use crate::clock::SharedClock;
use crate::error::SessionError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Minimum words read in a session before a comprehension quiz is offered.
pub const MIN_WORDS_FOR_QUIZ: usize = 300;

/// In-progress session bookkeeping.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub document_id: String,
    pub session_start_index: usize,
    pub started_at: DateTime<Local>,
    pub accumulated_active: Duration,
    pub active_since: Option<Duration>,
}

impl SessionRecord {
    pub fn is_active(&self) -> bool {
        self.active_since.is_some()
    }
}

/// Hand-off data for the quiz and session history collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub document_id: String,
    pub document_title: String,
    pub wpm_used: u32,
    pub words_read: usize,
    pub duration_seconds: u64,
    pub completed_at: DateTime<Local>,
}

impl SessionSummary {
    /// Words per minute actually achieved over the active reading time.
    pub fn effective_wpm(&self) -> f64 {
        if self.duration_seconds == 0 {
            0.0
        } else {
            self.words_read as f64 * 60.0 / self.duration_seconds as f64
        }
    }

    pub fn qualifies_for_quiz(&self) -> bool {
        self.words_read >= MIN_WORDS_FOR_QUIZ
    }
}

#[derive(Debug, Clone)]
enum TrackerState {
    NotStarted,
    InProgress(SessionRecord),
    Finished,
}

/// Session-scoped metrics with pausable wall-clock accounting.
pub struct SessionTracker {
    clock: SharedClock,
    state: TrackerState,
}

impl SessionTracker {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            state: TrackerState::NotStarted,
        }
    }

    pub fn begin_session(&mut self, document_id: &str, start_index: usize) {
        let record = SessionRecord {
            document_id: document_id.to_string(),
            session_start_index: start_index,
            started_at: self.clock.wall_time(),
            accumulated_active: Duration::ZERO,
            active_since: Some(self.clock.now()),
        };
        info!(document_id, start_index, "session started");
        self.state = TrackerState::InProgress(record);
    }

    pub fn has_begun(&self) -> bool {
        !matches!(self.state, TrackerState::NotStarted)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TrackerState::Finished)
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        match &self.state {
            TrackerState::InProgress(record) => Some(record),
            _ => None,
        }
    }

    pub fn resume(&mut self) {
        let now = self.clock.now();
        if let TrackerState::InProgress(record) = &mut self.state {
            if record.active_since.is_none() {
                record.active_since = Some(now);
                debug!("session time resumed");
            }
        }
    }

    pub fn freeze(&mut self) {
        let now = self.clock.now();
        if let TrackerState::InProgress(record) = &mut self.state {
            if let Some(since) = record.active_since.take() {
                record.accumulated_active += now.saturating_sub(since);
                debug!(
                    active_secs = record.accumulated_active.as_secs_f64(),
                    "session time frozen"
                );
            }
        }
    }

    /// Active time so far, including the currently running stretch.
    pub fn elapsed_active(&self) -> Duration {
        match &self.state {
            TrackerState::InProgress(record) => {
                let running = record
                    .active_since
                    .map(|since| self.clock.now().saturating_sub(since))
                    .unwrap_or_default();
                record.accumulated_active + running
            }
            _ => Duration::ZERO,
        }
    }

    pub fn finish(
        &mut self,
        current_index: usize,
        document_title: &str,
        wpm_used: u32,
    ) -> Result<SessionSummary, SessionError> {
        let duration = self.elapsed_active();
        let record = match std::mem::replace(&mut self.state, TrackerState::Finished) {
            TrackerState::InProgress(record) => record,
            TrackerState::Finished => return Err(SessionError::SessionAlreadyFinished),
            TrackerState::NotStarted => {
                self.state = TrackerState::NotStarted;
                return Err(SessionError::SessionNotStarted);
            }
        };

        let summary = SessionSummary {
            document_id: record.document_id,
            document_title: document_title.to_string(),
            wpm_used,
            words_read: current_index.saturating_sub(record.session_start_index),
            duration_seconds: duration.as_secs(),
            completed_at: self.clock.wall_time(),
        };
        info!(
            document_id = %summary.document_id,
            words_read = summary.words_read,
            duration_seconds = summary.duration_seconds,
            "session finished"
        );
        Ok(summary)
    }
}
