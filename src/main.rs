mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use speedpace::{
    advisor::compute_speed_adjustment,
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    document::FileDocumentSource,
    quiz::MIN_WORDS_FOR_QUIZ,
    runtime::{InputQueue, ReaderEvent, Runner},
    session::ReadingSession,
    stats::{ReadingDb, SessionLog},
    tracker::SessionSummary,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Redraw cadence while paused, so resizes and status stay fresh.
const IDLE_TICK_MS: u64 = 250;

/// reading pacer tui with session tracking and speed advice
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Train reading speed with timed word and chunk presentation. Progress is saved on every pause, finished sessions are logged, and a comprehension score can be turned into a new target speed."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// read a plain-text file with the pacer
    Read {
        /// path to a .txt file
        file: PathBuf,

        /// words per minute (100-1000); defaults to the saved setting
        #[clap(short = 'w', long)]
        wpm: Option<u32>,

        /// words shown per tick when chunking (2-5)
        #[clap(short = 'c', long)]
        chunk_size: Option<usize>,

        /// show several words per tick
        #[clap(long)]
        chunking: bool,

        /// ignore saved progress and start from the first word
        #[clap(long)]
        restart: bool,
    },

    /// recommend a new speed from a comprehension score
    Advise {
        /// comprehension score in percent (0-100)
        #[clap(short = 's', long)]
        score: f64,

        /// speed the quiz was taken at; defaults to the saved setting
        #[clap(short = 'w', long)]
        wpm: Option<u32>,

        /// store the recommendation as the new default speed
        #[clap(long)]
        apply: bool,
    },

    /// show practice totals and recent sessions
    Stats {
        /// number of recent sessions to list
        #[clap(short = 'n', long, default_value_t = 10)]
        recent: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Read {
            file,
            wpm,
            chunk_size,
            chunking,
            restart,
        } => {
            if !stdin().is_tty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
            }
            read(file, wpm, chunk_size, chunking, restart)
        }
        Command::Advise { score, wpm, apply } => advise(score, wpm, apply),
        Command::Stats { recent } => stats(recent),
    }
}

fn read(
    file: PathBuf,
    wpm: Option<u32>,
    chunk_size: Option<usize>,
    chunking: bool,
    restart: bool,
) -> Result<(), Box<dyn Error>> {
    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let db = Rc::new(ReadingDb::new()?);

    let document_id = FileDocumentSource::document_id(&file);
    let mut session = ReadingSession::open(
        &FileDocumentSource,
        Box::new(db.clone()),
        &config,
        &document_id,
        SystemClock::shared(),
    )?;

    if let Some(wpm) = wpm {
        session.set_wpm(wpm);
    }
    if let Some(size) = chunk_size {
        session.set_chunk_size(size);
    }
    if chunking {
        session.set_chunking_enabled(true);
    }
    if restart {
        session.restart_from_beginning();
    } else if session.has_resume_point() {
        info!(
            index = session.navigation().current_index(),
            "resuming from saved progress"
        );
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = run_reader(&mut terminal, &mut session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    let summary = session.finish()?;
    print_summary(&summary, &session);

    match db.complete_session(&summary) {
        Ok(practice) => println!(
            "streak: {} day(s)  |  sessions: {}  |  total: {} min",
            practice.current_streak,
            practice.sessions_completed,
            practice.total_minutes()
        ),
        Err(err) => warn!("failed to record session: {err}"),
    }

    config.remember(session.pacing());
    if let Err(err) = config_store.save(&config) {
        warn!(path = %config_store.path().display(), "failed to save settings: {err}");
    }

    Ok(())
}

fn run_reader<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut ReadingSession,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(InputQueue::terminal(), Duration::from_millis(IDLE_TICK_MS));
    terminal.draw(|f| ui::draw(f, session))?;

    loop {
        match runner.step(session.time_until_next_tick()) {
            ReaderEvent::Tick => {
                session.poll();
            }
            ReaderEvent::Resize => {}
            ReaderEvent::Command(cmd) => {
                if !cmd.apply(session) {
                    break;
                }
            }
            ReaderEvent::Closed => {
                warn!("terminal input closed, finishing session");
                break;
            }
        }
        terminal.draw(|f| ui::draw(f, session))?;
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary, session: &ReadingSession) {
    println!("{}", summary.document_title);
    println!(
        "words read: {}  |  time: {}m {:02}s  |  pace: {} wpm (achieved {:.0})",
        summary.words_read,
        summary.duration_seconds / 60,
        summary.duration_seconds % 60,
        summary.wpm_used,
        summary.effective_wpm()
    );
    if summary.qualifies_for_quiz() {
        println!(
            "comprehension check ready: {} words of passage",
            session.quiz_passage().split_whitespace().count()
        );
        println!("after answering, run `speedpace advise --score <percent>` for a new target speed");
    } else {
        println!(
            "read at least {} words in one session to unlock a comprehension check",
            MIN_WORDS_FOR_QUIZ
        );
    }
}

fn advise(score: f64, wpm: Option<u32>, apply: bool) -> Result<(), Box<dyn Error>> {
    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let current = wpm.unwrap_or_else(|| config.effective_wpm());

    let adjustment = compute_speed_adjustment(score.clamp(0.0, 100.0), current);
    println!("{}", adjustment.rationale);
    println!(
        "current: {} wpm  ->  recommended: {} wpm",
        adjustment.current_wpm, adjustment.recommended_wpm
    );

    if apply {
        config.default_wpm = adjustment.recommended_wpm;
        config_store.save(&config)?;
        info!(wpm = adjustment.recommended_wpm, "applied speed adjustment");
        println!("saved {} wpm as your default speed", adjustment.recommended_wpm);
    }
    Ok(())
}

fn stats(recent: usize) -> Result<(), Box<dyn Error>> {
    let db = ReadingDb::new()?;
    let practice = db.practice_stats()?;
    println!(
        "sessions: {}  |  total: {} min  |  streak: {} day(s)",
        practice.sessions_completed,
        practice.total_minutes(),
        practice.current_streak
    );

    let sessions = db.recent_sessions(recent)?;
    if sessions.is_empty() {
        println!("no sessions recorded yet");
        return Ok(());
    }
    for s in &sessions {
        println!(
            "{}  {:<30}  {:>5} words  {:>4} wpm  {:>4}s",
            s.completed_at.format("%Y-%m-%d %H:%M"),
            s.document_title,
            s.words_read,
            s.wpm_used,
            s.duration_seconds
        );
    }
    Ok(())
}
