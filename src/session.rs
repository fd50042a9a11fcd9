use crate::advisor::{compute_speed_adjustment, SpeedAdjustment};
use crate::clock::SharedClock;
use crate::config::{PacingConfig, UserDefaults};
use crate::document::DocumentSource;
use crate::error::{OpenError, SessionError};
use crate::navigation::NavigationEngine;
use crate::pacer::PacerClock;
use crate::progress::{has_resume_point, ProgressStore};
use crate::tokenizer::tokenize;
use crate::tracker::{SessionSummary, SessionTracker};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Undelivered events kept per observer.
pub const OBSERVER_BACKLOG: usize = 64;

/// Snapshot the host renders after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub chunk_text: String,
    pub progress_fraction: f64,
    pub current_index: usize,
    pub total_words: usize,
    pub wpm: u32,
    pub font_size: u32,
    pub is_playing: bool,
    pub is_finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Display(DisplayState),
    /// the pacer reached the end of the text
    Finished,
    ProgressSaveFailed(String),
}

/// One reading flow over one document: pacer, navigator and tracker wired
/// together behind the host-facing API.
pub struct ReadingSession {
    document_id: String,
    document_title: String,
    pacing: PacingConfig,
    navigation: NavigationEngine,
    pacer: PacerClock,
    tracker: SessionTracker,
    clock: SharedClock,
    progress: Box<dyn ProgressStore>,
    saved_index: Option<usize>,
    session_floor: usize,
    reached_end: bool,
    observers: Vec<SyncSender<SessionEvent>>,
}

impl ReadingSession {
    pub fn load(
        document_id: &str,
        document_title: &str,
        text: &str,
        saved_index: Option<usize>,
        pacing: PacingConfig,
        clock: SharedClock,
        progress: Box<dyn ProgressStore>,
    ) -> Self {
        let tokens = tokenize(text);
        let navigation = NavigationEngine::new(tokens, saved_index.unwrap_or(0));
        let session_floor = navigation.current_index();
        info!(
            document_id,
            total_words = navigation.total_words(),
            start_index = session_floor,
            "document loaded"
        );

        Self {
            document_id: document_id.to_string(),
            document_title: document_title.to_string(),
            pacing,
            navigation,
            pacer: PacerClock::new(),
            tracker: SessionTracker::new(clock.clone()),
            clock,
            progress,
            saved_index,
            session_floor,
            reached_end: false,
            observers: Vec::new(),
        }
    }

    /// Fetch text and saved progress from the collaborators, then load.
    pub fn open(
        source: &dyn DocumentSource,
        progress: Box<dyn ProgressStore>,
        defaults: &dyn UserDefaults,
        document_id: &str,
        clock: SharedClock,
    ) -> Result<Self, OpenError> {
        let document = source.get_text(document_id)?;
        let saved_index = progress.load(document_id)?;
        Ok(Self::load(
            &document.id,
            &document.title,
            &document.text,
            saved_index,
            defaults.initial_pacing_config(),
            clock,
            progress,
        ))
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn document_title(&self) -> &str {
        &self.document_title
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    pub fn navigation(&self) -> &NavigationEngine {
        &self.navigation
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn session_floor(&self) -> usize {
        self.session_floor
    }

    pub fn is_playing(&self) -> bool {
        self.pacer.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.reached_end || self.tracker.is_finished()
    }

    /// Whether the host should offer "continue where you left off".
    pub fn has_resume_point(&self) -> bool {
        has_resume_point(self.saved_index)
    }

    /// Observe session events. Each observer buffers at most
    /// [`OBSERVER_BACKLOG`] undelivered events; while full, new events are
    /// dropped for it, so a slow reader should fall back to
    /// [`ReadingSession::display_state`].
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::sync_channel(OBSERVER_BACKLOG);
        self.observers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.observers
            .retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    fn notify_display(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let state = self.display_state();
        self.emit(SessionEvent::Display(state));
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            chunk_text: self
                .navigation
                .current_chunk(self.pacing.effective_chunk_size()),
            progress_fraction: self.navigation.progress_fraction(),
            current_index: self.navigation.current_index(),
            total_words: self.navigation.total_words(),
            wpm: self.pacing.wpm(),
            font_size: self.pacing.font_size(),
            is_playing: self.is_playing(),
            is_finished: self.is_finished(),
        }
    }

    /// Start or resume playback. The first call after load begins the
    /// session; an exhausted text signals completion instead of ticking.
    pub fn play(&mut self) {
        if self.is_finished() || self.pacer.is_running() {
            return;
        }
        if self.navigation.is_exhausted() {
            self.begin_if_needed();
            self.tracker.freeze();
            self.mark_reached_end();
            return;
        }

        if !self.begin_if_needed() {
            self.tracker.resume();
        }
        self.pacer.start(self.clock.now(), self.pacing.wpm());
        self.notify_display();
    }

    // Returns true when this call created the session record.
    fn begin_if_needed(&mut self) -> bool {
        if self.tracker.has_begun() {
            return false;
        }
        self.tracker
            .begin_session(&self.document_id, self.session_floor);
        true
    }

    /// Stop playback, freeze session time and save the position.
    pub fn pause(&mut self) {
        self.pacer.pause();
        self.tracker.freeze();
        self.save_progress();
        self.notify_display();
    }

    fn save_progress(&mut self) {
        let index = self.navigation.current_index();
        match self.progress.save(&self.document_id, index) {
            Ok(()) => {
                debug!(document_id = %self.document_id, index, "progress saved");
                self.saved_index = Some(index);
            }
            Err(err) => {
                warn!(document_id = %self.document_id, index, "failed to save progress: {err}");
                self.emit(SessionEvent::ProgressSaveFailed(err.to_string()));
            }
        }
    }

    fn mark_reached_end(&mut self) {
        if self.reached_end {
            return;
        }
        self.reached_end = true;
        info!(document_id = %self.document_id, "reached end of text");
        self.emit(SessionEvent::Finished);
        self.notify_display();
    }

    /// Time the host may wait before calling [`ReadingSession::poll`].
    pub fn time_until_next_tick(&self) -> Option<Duration> {
        self.pacer.time_until_next(self.clock.now())
    }

    /// Drive the pacer from the clock. Returns true when the position moved.
    pub fn poll(&mut self) -> bool {
        if !self.pacer.poll(self.clock.now(), self.pacing.wpm()) {
            return false;
        }
        let result = self
            .navigation
            .advance(self.pacing.effective_chunk_size());
        if result.exhausted {
            self.pause();
            self.mark_reached_end();
        } else {
            self.notify_display();
        }
        true
    }

    pub fn step_back(&mut self) {
        self.navigation
            .step_back(self.pacing.effective_chunk_size(), self.session_floor);
        self.reached_end = self.navigation.is_exhausted() && self.reached_end;
        self.notify_display();
    }

    pub fn step_forward(&mut self) {
        self.navigation
            .step_forward(self.pacing.effective_chunk_size());
        self.reached_end = self.navigation.is_exhausted() && self.reached_end;
        self.notify_display();
    }

    pub fn seek_sentence_start(&mut self) {
        self.navigation.seek_to_sentence_start(self.session_floor);
        self.reached_end = self.navigation.is_exhausted() && self.reached_end;
        self.notify_display();
    }

    /// Answer "start over" to the resume prompt. Only honoured before the
    /// first play.
    pub fn restart_from_beginning(&mut self) -> bool {
        if self.tracker.has_begun() {
            debug!("restart ignored: session already begun");
            return false;
        }
        let tokens = self.navigation.tokens().clone();
        self.navigation.initialize(tokens, 0);
        self.session_floor = 0;
        self.reached_end = false;
        self.save_progress();
        self.notify_display();
        true
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        self.pacing.set_wpm(wpm);
        self.notify_display();
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.pacing.set_chunk_size(size);
        self.notify_display();
    }

    pub fn set_chunking_enabled(&mut self, enabled: bool) {
        self.pacing.set_chunking_enabled(enabled);
        self.notify_display();
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.pacing.set_font_size(size);
        self.notify_display();
    }

    /// Text read during this session, handed to the quiz generator.
    pub fn quiz_passage(&self) -> String {
        self.navigation
            .passage(self.session_floor, self.navigation.current_index())
    }

    /// End the session. Pauses (and therefore saves) first. Finishing a
    /// session that never played reports zero words and zero time.
    pub fn finish(&mut self) -> Result<SessionSummary, SessionError> {
        if self.tracker.is_finished() {
            return Err(SessionError::SessionAlreadyFinished);
        }
        self.pause();
        if self.begin_if_needed() {
            self.tracker.freeze();
        }
        let summary = self.tracker.finish(
            self.navigation.current_index(),
            &self.document_title,
            self.pacing.wpm(),
        )?;
        self.notify_display();
        Ok(summary)
    }

    pub fn compute_speed_adjustment(comprehension_score: f64, wpm: u32) -> SpeedAdjustment {
        compute_speed_adjustment(comprehension_score, wpm)
    }
}
