//! Database schema migrations for studymate.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: baseline.
///
/// The deadline and timetable tables are created by `Database::migrate()`
/// directly; this only records the version.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)
}

/// Migration v2: study timer log.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS study_sessions (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id           INTEGER NOT NULL,
            timer_type        TEXT NOT NULL,
            planned_minutes   INTEGER NOT NULL,
            completed_seconds INTEGER NOT NULL DEFAULT 0,
            interruptions     INTEGER NOT NULL DEFAULT 0,
            focus_score       REAL NOT NULL DEFAULT 0.0,
            started_at        TEXT NOT NULL,
            ended_at          TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_study_sessions_user ON study_sessions(user_id, started_at);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: entry type on timetable entries, lookup indexes.
///
/// Existing entries were all applied study sessions, so they default to
/// `study`.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    let has_entry_type: bool = tx
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('timetable_entries') WHERE name = 'entry_type'",
            [],
            |row| row.get::<_, i32>(0),
        )
        .unwrap_or(0)
        > 0;

    if !has_entry_type {
        tx.execute_batch(
            "ALTER TABLE timetable_entries ADD COLUMN entry_type TEXT NOT NULL DEFAULT 'study';",
        )?;
    }

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_deadlines_user_due ON deadlines(user_id, completed, due_date);
         CREATE INDEX IF NOT EXISTS idx_timetable_entries_user_start ON timetable_entries(user_id, start_time);",
    )?;

    set_schema_version(&tx, 3)?;
    tx.commit()
}
