use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::progress::ProgressStore;
use crate::tracker::SessionSummary;
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Persistence for finished sessions.
pub trait SessionLog {
    fn record_session(&self, summary: &SessionSummary) -> Result<(), StoreError>;
    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError>;
}

/// Lifetime practice counters shown on the progress screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeStats {
    pub total_reading_seconds: u64,
    pub sessions_completed: u32,
    pub current_streak: u32,
    pub last_practice_date: Option<NaiveDate>,
}

impl PracticeStats {
    /// Fold one finished session into the counters.
    ///
    /// The streak holds if the user already practiced today, grows by one if
    /// the last practice was yesterday, and restarts at 1 otherwise.
    pub fn record_session(&self, duration_seconds: u64, today: NaiveDate) -> PracticeStats {
        let current_streak = match self.last_practice_date {
            Some(last) if last >= today => self.current_streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.current_streak + 1,
            _ => 1,
        };
        PracticeStats {
            total_reading_seconds: self.total_reading_seconds + duration_seconds,
            sessions_completed: self.sessions_completed + 1,
            current_streak,
            last_practice_date: Some(today),
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_reading_seconds / 60
    }
}

/// UTC with fixed precision, so text order in SQLite is time order even
/// across offset changes.
fn sortable_timestamp(at: &DateTime<Local>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite-backed store for reading progress, session history and practice
/// counters.
#[derive(Debug)]
pub struct ReadingDb {
    conn: Connection,
}

impl ReadingDb {
    /// Open the database at the default location, creating tables if needed
    pub fn new() -> Result<Self, StoreError> {
        Self::open(AppDirs::resolve().db_path())
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened reading database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reading_progress (
                document_id TEXT PRIMARY KEY,
                word_index INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reading_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id TEXT NOT NULL,
                document_title TEXT NOT NULL,
                wpm_used INTEGER NOT NULL,
                words_read INTEGER NOT NULL,
                duration_seconds INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reading_sessions_completed
                ON reading_sessions(completed_at);

            CREATE TABLE IF NOT EXISTS practice_stats (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                total_reading_seconds INTEGER NOT NULL,
                sessions_completed INTEGER NOT NULL,
                current_streak INTEGER NOT NULL,
                last_practice_date TEXT
            );
            "#,
        )?;
        Ok(ReadingDb { conn })
    }

    pub fn practice_stats(&self) -> Result<PracticeStats, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT total_reading_seconds, sessions_completed, current_streak, last_practice_date
                FROM practice_stats WHERE id = 1
                "#,
                [],
                |row| {
                    let last: Option<String> = row.get(3)?;
                    Ok(PracticeStats {
                        total_reading_seconds: row.get::<_, i64>(0)?.max(0) as u64,
                        sessions_completed: row.get(1)?,
                        current_streak: row.get(2)?,
                        last_practice_date: last
                            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_default())
    }

    fn write_practice_stats(conn: &Connection, stats: &PracticeStats) -> Result<(), StoreError> {
        conn.execute(
            r#"
            INSERT INTO practice_stats
            (id, total_reading_seconds, sessions_completed, current_streak, last_practice_date)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                total_reading_seconds = excluded.total_reading_seconds,
                sessions_completed = excluded.sessions_completed,
                current_streak = excluded.current_streak,
                last_practice_date = excluded.last_practice_date
            "#,
            params![
                stats.total_reading_seconds as i64,
                stats.sessions_completed,
                stats.current_streak,
                stats
                    .last_practice_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn insert_session(conn: &Connection, summary: &SessionSummary) -> Result<(), StoreError> {
        conn.execute(
            r#"
            INSERT INTO reading_sessions
            (document_id, document_title, wpm_used, words_read, duration_seconds, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                summary.document_id,
                summary.document_title,
                summary.wpm_used,
                summary.words_read as i64,
                summary.duration_seconds as i64,
                sortable_timestamp(&summary.completed_at),
            ],
        )?;
        Ok(())
    }

    /// Record a finished session and fold it into the practice counters in
    /// one transaction.
    pub fn complete_session(
        &self,
        summary: &SessionSummary,
    ) -> Result<PracticeStats, StoreError> {
        let today = summary.completed_at.date_naive();
        let tx = self.conn.unchecked_transaction()?;
        Self::insert_session(&tx, summary)?;
        let stats = self
            .practice_stats()?
            .record_session(summary.duration_seconds, today);
        Self::write_practice_stats(&tx, &stats)?;
        tx.commit()?;
        info!(
            sessions_completed = stats.sessions_completed,
            current_streak = stats.current_streak,
            "practice stats updated"
        );
        Ok(stats)
    }
}

impl ProgressStore for ReadingDb {
    fn save(&self, document_id: &str, word_index: usize) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO reading_progress (document_id, word_index, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(document_id) DO UPDATE SET
                word_index = excluded.word_index,
                updated_at = excluded.updated_at
            "#,
            params![document_id, word_index as i64, sortable_timestamp(&Local::now())],
        )?;
        Ok(())
    }

    fn load(&self, document_id: &str) -> Result<Option<usize>, StoreError> {
        let idx: Option<i64> = self
            .conn
            .query_row(
                "SELECT word_index FROM reading_progress WHERE document_id = ?1",
                [document_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(idx.map(|i| i.max(0) as usize))
    }
}

impl SessionLog for ReadingDb {
    fn record_session(&self, summary: &SessionSummary) -> Result<(), StoreError> {
        Self::insert_session(&self.conn, summary)
    }

    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT document_id, document_title, wpm_used, words_read, duration_seconds, completed_at
            FROM reading_sessions
            ORDER BY completed_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let session_iter = stmt.query_map([limit as i64], |row| {
            let completed_str: String = row.get(5)?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        5,
                        "completed_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionSummary {
                document_id: row.get(0)?,
                document_title: row.get(1)?,
                wpm_used: row.get(2)?,
                words_read: row.get::<_, i64>(3)?.max(0) as usize,
                duration_seconds: row.get::<_, i64>(4)?.max(0) as u64,
                completed_at,
            })
        })?;

        let mut sessions = Vec::new();
        for session in session_iter {
            sessions.push(session?);
        }
        Ok(sessions)
    }
}
