//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Deadlines and their remaining study-hour budgets
//! - Applied timetable entries (the user's calendar)
//! - The study timer session log

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations};
use crate::deadline::{Deadline, NewDeadline, Priority, DATETIME_FORMAT};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::planner::{
    DeadlineSource, NewTimetableEntry, StudyContext, TimetableEntry, TimetableSink,
};
use crate::timer::{StudySession, TimerOutcome};

const DEADLINE_COLUMNS: &str = "id, user_id, title, subject, due_date, priority, study_hours,
     description, completed, created_at";

const ENTRY_COLUMNS: &str = "id, user_id, title, start_time, end_time, subject, description,
     duration_minutes, priority, entry_type, created_at";

const SESSION_COLUMNS: &str = "id, user_id, timer_type, planned_minutes, completed_seconds,
     interruptions, focus_score, started_at, ended_at";

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored wall-clock timestamp, accepting a `T` separator.
fn parse_datetime(raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&raw.replacen('T', " ", 1), DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse an RFC3339 timestamp with fallback to current time
fn parse_utc_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_deadline(row: &rusqlite::Row) -> rusqlite::Result<Deadline> {
    let due_date: String = row.get(4)?;
    let priority: String = row.get(5)?;
    let created_at: String = row.get(9)?;
    Ok(Deadline {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        subject: row.get(3)?,
        due_date: parse_datetime(&due_date)?,
        priority: Priority::parse_lenient(&priority),
        remaining_hours: row.get(6)?,
        description: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        completed: row.get(8)?,
        created_at: parse_utc_fallback(&created_at),
    })
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<TimetableEntry> {
    let start_time: String = row.get(3)?;
    let end_time: String = row.get(4)?;
    let created_at: String = row.get(10)?;
    Ok(TimetableEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        start_time: parse_datetime(&start_time)?,
        end_time: parse_datetime(&end_time)?,
        subject: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        duration_minutes: row.get(7)?,
        priority: row.get(8)?,
        entry_type: row.get(9)?,
        created_at: parse_utc_fallback(&created_at),
    })
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<StudySession> {
    let started_at: String = row.get(7)?;
    let ended_at: Option<String> = row.get(8)?;
    Ok(StudySession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        timer_type: row.get(2)?,
        planned_minutes: row.get(3)?,
        completed_seconds: row.get(4)?,
        interruptions: row.get(5)?,
        focus_score: row.get(6)?,
        started_at: parse_datetime(&started_at)?,
        ended_at: ended_at.as_deref().map(parse_datetime).transpose()?,
    })
}

/// SQLite database for deadlines, the applied timetable and the timer log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/studymate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened,
    /// or if migration fails.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studymate.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if migration fails.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS deadlines (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id     INTEGER NOT NULL,
                    title       TEXT NOT NULL,
                    subject     TEXT NOT NULL DEFAULT '',
                    due_date    TEXT NOT NULL,
                    priority    TEXT NOT NULL DEFAULT 'medium',
                    study_hours INTEGER NOT NULL DEFAULT 5,
                    description TEXT,
                    completed   INTEGER NOT NULL DEFAULT 0,
                    created_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS timetable_entries (
                    id               INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id          INTEGER NOT NULL,
                    title            TEXT NOT NULL,
                    start_time       TEXT NOT NULL,
                    end_time         TEXT NOT NULL,
                    subject          TEXT,
                    description      TEXT,
                    duration_minutes INTEGER NOT NULL DEFAULT 0,
                    priority         TEXT NOT NULL DEFAULT 'medium',
                    created_at       TEXT NOT NULL
                );",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Deadlines ===

    /// Insert a deadline; its remaining budget starts at `study_hours`.
    ///
    /// # Errors
    /// Returns a validation error for an empty title, or the insert failure.
    pub fn add_deadline(&self, deadline: &NewDeadline) -> Result<i64> {
        if deadline.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        self.conn.execute(
            "INSERT INTO deadlines (user_id, title, subject, due_date, priority, study_hours,
                                    description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                deadline.user_id,
                deadline.title.trim(),
                deadline.subject.trim(),
                format_datetime(&deadline.due_date),
                deadline.priority.as_str(),
                deadline.study_hours,
                deadline.description,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, user_id = deadline.user_id, "added deadline");
        Ok(id)
    }

    pub fn get_deadline(&self, id: i64) -> Result<Option<Deadline>> {
        let sql = format!("SELECT {DEADLINE_COLUMNS} FROM deadlines WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_deadline)
            .optional()?)
    }

    /// Deadlines of `user_id`, earliest due first.
    pub fn list_deadlines(&self, user_id: i64, include_completed: bool) -> Result<Vec<Deadline>> {
        let sql = format!(
            "SELECT {DEADLINE_COLUMNS} FROM deadlines
             WHERE user_id = ?1 AND (?2 OR completed = 0)
             ORDER BY due_date ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, include_completed], row_to_deadline)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overwrite a deadline's remaining study-hour budget.
    ///
    /// # Errors
    /// Returns `ValidationError::NotFound` for an unknown id.
    pub fn set_remaining_hours(&self, id: i64, hours: u32) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE deadlines SET study_hours = ?1 WHERE id = ?2",
            params![hours, id],
        )?;
        ensure_found(changed, "deadline", id)
    }

    /// Mark a deadline completed (or reopen it).
    ///
    /// # Errors
    /// Returns `ValidationError::NotFound` for an unknown id.
    pub fn set_completed(&self, id: i64, completed: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE deadlines SET completed = ?1 WHERE id = ?2",
            params![completed, id],
        )?;
        ensure_found(changed, "deadline", id)
    }

    /// # Errors
    /// Returns `ValidationError::NotFound` for an unknown id.
    pub fn delete_deadline(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM deadlines WHERE id = ?1", params![id])?;
        ensure_found(changed, "deadline", id)
    }

    // === Timetable entries ===

    /// Replace all entries of `user_id` in a single transaction.
    ///
    /// On any failure the transaction is rolled back and the previous
    /// calendar is kept.
    pub fn replace_timetable_entries(
        &self,
        user_id: i64,
        entries: &[NewTimetableEntry],
    ) -> Result<usize> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: rusqlite::Result<usize> = (|| {
            self.conn.execute(
                "DELETE FROM timetable_entries WHERE user_id = ?1",
                params![user_id],
            )?;
            let mut stmt = self.conn.prepare(
                "INSERT INTO timetable_entries (user_id, title, start_time, end_time, subject,
                                                description, duration_minutes, priority,
                                                entry_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            let created_at = Utc::now().to_rfc3339();
            for entry in entries {
                stmt.execute(params![
                    user_id,
                    entry.title,
                    format_datetime(&entry.start_time),
                    format_datetime(&entry.end_time),
                    entry.subject,
                    entry.description,
                    entry.duration_minutes,
                    entry.priority,
                    entry.entry_type,
                    created_at,
                ])?;
            }
            Ok(entries.len())
        })();
        match result {
            Ok(inserted) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(inserted)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                tracing::warn!(user_id, error = %err, "timetable replacement rolled back");
                Err(err.into())
            }
        }
    }

    /// Entries of `user_id`, ordered by start time then insertion.
    pub fn list_timetable_entries(&self, user_id: i64) -> Result<Vec<TimetableEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM timetable_entries
             WHERE user_id = ?1
             ORDER BY start_time ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_entry)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // === Study timer log ===

    /// Open a timer session for the context user.
    pub fn start_study_session(
        &self,
        ctx: &StudyContext,
        timer_type: &str,
        planned_minutes: u32,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO study_sessions (user_id, timer_type, planned_minutes, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![ctx.user_id, timer_type, planned_minutes, format_datetime(&ctx.now)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Close a timer session with the client-reported outcome.
    ///
    /// # Errors
    /// Returns `NotFound` if the session does not exist or belongs to another
    /// user, and `InvalidValue` if it was already ended.
    pub fn end_study_session(
        &self,
        ctx: &StudyContext,
        id: i64,
        outcome: &TimerOutcome,
    ) -> Result<StudySession> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE id = ?1");
        let session = self
            .conn
            .query_row(&sql, params![id], row_to_session)
            .optional()?
            .filter(|s| s.user_id == ctx.user_id)
            .ok_or(ValidationError::NotFound {
                entity: "study session",
                id,
            })?;
        if !session.is_open() {
            return Err(ValidationError::InvalidValue {
                field: "session_id".to_string(),
                message: format!("study session {id} has already ended"),
            }
            .into());
        }

        if !outcome.focus_score.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "focus_score".to_string(),
                message: format!("must be a number, got {}", outcome.focus_score),
            }
            .into());
        }
        let focus_score = outcome.focus_score.clamp(0.0, 100.0);
        self.conn.execute(
            "UPDATE study_sessions
             SET completed_seconds = ?1, interruptions = ?2, focus_score = ?3, ended_at = ?4
             WHERE id = ?5",
            params![
                outcome.completed_seconds,
                outcome.interruptions,
                focus_score,
                format_datetime(&ctx.now),
                id,
            ],
        )?;

        Ok(StudySession {
            completed_seconds: outcome.completed_seconds,
            interruptions: outcome.interruptions,
            focus_score,
            ended_at: Some(ctx.now),
            ..session
        })
    }

    /// All timer sessions of `user_id`, oldest first.
    pub fn study_sessions(&self, user_id: i64) -> Result<Vec<StudySession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions
             WHERE user_id = ?1
             ORDER BY started_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_session)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn ensure_found(changed: usize, entity: &'static str, id: i64) -> Result<()> {
    if changed == 0 {
        Err(ValidationError::NotFound { entity, id }.into())
    } else {
        Ok(())
    }
}

impl DeadlineSource for Database {
    fn pending_deadlines(&self, user_id: i64) -> Result<Vec<Deadline>> {
        self.list_deadlines(user_id, false)
    }
}

impl TimetableSink for Database {
    fn replace_timetable(&mut self, user_id: i64, entries: &[NewTimetableEntry]) -> Result<usize> {
        self.replace_timetable_entries(user_id, entries)
    }

    fn timetable_entries(&self, user_id: i64) -> Result<Vec<TimetableEntry>> {
        self.list_timetable_entries(user_id)
    }
}
