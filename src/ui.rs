use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use speedpace::session::ReadingSession;
use unicode_width::UnicodeWidthStr;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const HELP: &str = "space play/pause  ←/→ step  s sentence  +/- wpm  [/] chunk  c chunking  q finish";

/// The reading screen: current chunk in the middle, progress under it,
/// status and key help along the bottom.
pub struct ReaderView<'a> {
    session: &'a ReadingSession,
}

impl<'a> ReaderView<'a> {
    pub fn new(session: &'a ReadingSession) -> Self {
        Self { session }
    }

    fn status_text(&self) -> String {
        let state = self.session.display_state();
        let pacing = self.session.pacing();
        let mode = if state.is_finished {
            "finished"
        } else if state.is_playing {
            "playing"
        } else {
            "paused"
        };
        let chunk = if pacing.chunking_enabled() {
            pacing.chunk_size().to_string()
        } else {
            "off".to_string()
        };
        format!(
            "{}  |  {} wpm  |  chunk {}  |  word {}/{}  |  {}",
            self.session.document_title(),
            state.wpm,
            chunk,
            state.current_index.min(state.total_words),
            state.total_words,
            mode
        )
    }
}

impl Widget for ReaderView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.session.display_state();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),    // padding
                Constraint::Length(1), // chunk
                Constraint::Length(1), // padding
                Constraint::Length(1), // progress
                Constraint::Min(1),    // padding
                Constraint::Length(1), // status
                Constraint::Length(1), // help
            ])
            .split(area);

        let chunk_area = chunks[1];
        let (text, style) = if state.is_finished && state.chunk_text.is_empty() {
            ("[ end ]".to_string(), dim_style)
        } else {
            (state.chunk_text, bold_style.fg(Color::Yellow))
        };
        // a chunk wider than the screen wraps from the left edge
        let alignment = if text.width() <= usize::from(chunk_area.width) {
            Alignment::Center
        } else {
            Alignment::Left
        };
        Paragraph::new(Span::styled(text, style))
            .alignment(alignment)
            .wrap(Wrap { trim: true })
            .render(chunk_area, buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(state.progress_fraction.clamp(0.0, 1.0))
            .label(format!("{:.0}%", state.progress_fraction * 100.0))
            .render(chunks[3], buf);

        Paragraph::new(Line::from(Span::styled(self.status_text(), dim_style)))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        Paragraph::new(Span::styled(HELP, dim_style.add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }
}

pub fn draw(f: &mut Frame, session: &ReadingSession) {
    f.render_widget(ReaderView::new(session), f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedpace::clock::ManualClock;
    use speedpace::config::PacingConfig;
    use speedpace::progress::MemoryProgressStore;
    use std::sync::Arc;

    fn session(text: &str) -> (ReadingSession, ManualClock) {
        let clock = ManualClock::new();
        let session = ReadingSession::load(
            "doc",
            "Notes",
            text,
            None,
            PacingConfig::new(600, false, 2, 48),
            Arc::new(clock.clone()),
            Box::new(MemoryProgressStore::new()),
        );
        (session, clock)
    }

    fn rendered(session: &ReadingSession, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        ReaderView::new(session).render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_chunk_is_centered() {
        let (session, _clock) = session("alpha beta gamma");
        let lines = rendered(&session, 60, 16);
        let row = lines
            .iter()
            .find(|l| l.contains("alpha"))
            .expect("chunk row");
        let left = row.find("alpha").unwrap();
        let right = row.len() - left - "alpha".len();
        assert!(left.abs_diff(right) <= 1, "{row:?}");
    }

    #[test]
    fn test_status_and_progress() {
        let (mut session, clock) = session("one two three four");
        session.play();
        clock.advance_ms(100);
        session.poll();
        clock.advance_ms(100);
        session.poll();

        let screen = rendered(&session, 80, 16).join("\n");
        assert!(screen.contains("three"));
        assert!(screen.contains("50%"));
        assert!(screen.contains("600 wpm"));
        assert!(screen.contains("word 2/4"));
        assert!(screen.contains("playing"));
    }

    #[test]
    fn test_end_marker_after_last_word() {
        let (mut session, clock) = session("just two");
        session.play();
        for _ in 0..3 {
            clock.advance_ms(100);
            session.poll();
        }
        let screen = rendered(&session, 80, 16).join("\n");
        assert!(screen.contains("[ end ]"));
        assert!(screen.contains("finished"));
        assert!(screen.contains("100%"));
    }
}
