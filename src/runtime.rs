use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::session::ReadingSession;

/// WPM change per keypress
pub const WPM_STEP: u32 = 25;

/// What the reader loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderEvent {
    Command(ReaderCommand),
    Resize,
    /// the wait expired: either a pacer deadline or an idle redraw
    Tick,
    /// input can no longer arrive; the loop should wind down
    Closed,
}

/// Reader actions bound to keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderCommand {
    TogglePlay,
    StepBack,
    StepForward,
    SentenceStart,
    Faster,
    Slower,
    LargerChunk,
    SmallerChunk,
    ToggleChunking,
    Finish,
}

impl ReaderCommand {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Self::Finish);
        }
        let cmd = match key.code {
            KeyCode::Char(' ') => Self::TogglePlay,
            KeyCode::Left | KeyCode::Char('h') => Self::StepBack,
            KeyCode::Right | KeyCode::Char('l') => Self::StepForward,
            KeyCode::Up | KeyCode::Char('s') => Self::SentenceStart,
            KeyCode::Char('+') | KeyCode::Char('=') => Self::Faster,
            KeyCode::Char('-') => Self::Slower,
            KeyCode::Char(']') => Self::LargerChunk,
            KeyCode::Char('[') => Self::SmallerChunk,
            KeyCode::Char('c') => Self::ToggleChunking,
            KeyCode::Char('q') | KeyCode::Esc => Self::Finish,
            _ => return None,
        };
        Some(cmd)
    }

    /// Apply to the session. Returns false when the reader should stop.
    pub fn apply(self, session: &mut ReadingSession) -> bool {
        match self {
            Self::TogglePlay => {
                if session.is_playing() {
                    session.pause();
                } else {
                    session.play();
                }
            }
            Self::StepBack => session.step_back(),
            Self::StepForward => session.step_forward(),
            Self::SentenceStart => session.seek_sentence_start(),
            Self::Faster => session.set_wpm(session.pacing().wpm().saturating_add(WPM_STEP)),
            Self::Slower => session.set_wpm(session.pacing().wpm().saturating_sub(WPM_STEP)),
            Self::LargerChunk => session.set_chunk_size(session.pacing().chunk_size() + 1),
            Self::SmallerChunk => {
                session.set_chunk_size(session.pacing().chunk_size().saturating_sub(1))
            }
            Self::ToggleChunking => {
                session.set_chunking_enabled(!session.pacing().chunking_enabled())
            }
            Self::Finish => return false,
        }
        true
    }
}

/// Queue of decoded reader input. Keys that map to no command never reach
/// the loop, so an idle keyboard costs nothing.
pub struct InputQueue {
    rx: Receiver<ReaderEvent>,
}

impl InputQueue {
    /// Read the terminal on a helper thread, decoding keys into commands
    /// there. The thread ends when the terminal errors or the queue is gone.
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            loop {
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) => match ReaderCommand::from_key(&key) {
                        Some(cmd) => tx.send(ReaderEvent::Command(cmd)),
                        None => Ok(()),
                    },
                    Ok(Event::Resize(_, _)) => tx.send(ReaderEvent::Resize),
                    Ok(_) => Ok(()),
                    Err(err) => {
                        debug!("terminal input stopped: {err}");
                        break;
                    }
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    /// Queue fed by hand, for headless drivers and tests.
    pub fn channel() -> (Sender<ReaderEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    fn next(&self, timeout: Duration) -> ReaderEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => ReaderEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => ReaderEvent::Closed,
        }
    }
}

/// Blocks between pacer deadlines, waking early for input and at least
/// every `idle` so the screen stays fresh while paused.
pub struct Runner {
    input: InputQueue,
    idle: Duration,
}

impl Runner {
    pub fn new(input: InputQueue, idle: Duration) -> Self {
        Self { input, idle }
    }

    /// How long `step` will block given the time left until the next pacer
    /// deadline, if any.
    pub fn wait_for(&self, until_deadline: Option<Duration>) -> Duration {
        until_deadline.map_or(self.idle, |left| left.min(self.idle))
    }

    pub fn step(&self, until_deadline: Option<Duration>) -> ReaderEvent {
        self.input.next(self.wait_for(until_deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, input) = InputQueue::channel();
        let runner = Runner::new(input, Duration::from_millis(1));
        assert_eq!(runner.step(None), ReaderEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, input) = InputQueue::channel();
        tx.send(ReaderEvent::Command(ReaderCommand::Faster)).unwrap();
        tx.send(ReaderEvent::Resize).unwrap();
        let runner = Runner::new(input, Duration::from_millis(10));

        assert_eq!(
            runner.step(Some(Duration::from_millis(5))),
            ReaderEvent::Command(ReaderCommand::Faster)
        );
        assert_eq!(runner.step(None), ReaderEvent::Resize);
    }

    #[test]
    fn dropped_input_reports_closed() {
        let (tx, input) = InputQueue::channel();
        let runner = Runner::new(input, Duration::from_secs(5));
        drop(tx);
        // returns at once instead of reporting a tick every call
        for _ in 0..3 {
            assert_eq!(runner.step(None), ReaderEvent::Closed);
        }
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            ReaderCommand::from_key(&key(KeyCode::Char(' '))),
            Some(ReaderCommand::TogglePlay)
        );
        assert_eq!(
            ReaderCommand::from_key(&key(KeyCode::Left)),
            Some(ReaderCommand::StepBack)
        );
        assert_eq!(
            ReaderCommand::from_key(&key(KeyCode::Esc)),
            Some(ReaderCommand::Finish)
        );
        assert_eq!(
            ReaderCommand::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ReaderCommand::Finish)
        );
        assert_eq!(
            ReaderCommand::from_key(&key(KeyCode::Char('c'))),
            Some(ReaderCommand::ToggleChunking)
        );
        assert_eq!(ReaderCommand::from_key(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = key(KeyCode::Char(' '));
        release.kind = KeyEventKind::Release;
        assert_eq!(ReaderCommand::from_key(&release), None);
    }

    #[test]
    fn wait_prefers_earlier_deadline() {
        let (_tx, input) = InputQueue::channel();
        let runner = Runner::new(input, Duration::from_millis(250));
        assert_eq!(runner.wait_for(None), Duration::from_millis(250));
        assert_eq!(
            runner.wait_for(Some(Duration::from_millis(40))),
            Duration::from_millis(40)
        );
        assert_eq!(
            runner.wait_for(Some(Duration::from_secs(3))),
            Duration::from_millis(250)
        );
        assert_eq!(runner.wait_for(Some(Duration::ZERO)), Duration::ZERO);
    }
}
