use super::{fmt_instant, parse_instant, parse_optional_instant};
use crate::errors::{AppError, AppResult};
use crate::models::entry_mode::EntryMode;
use crate::models::time_entry::TimeEntry;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, user_id, start_time, end_time, project_id, category_id, description, entry_mode";

pub fn map_row(row: &Row) -> rusqlite::Result<TimeEntry> {
    let start: String = row.get("start_time")?;
    let end: Option<String> = row.get("end_time")?;
    let mode_str: String = row.get("entry_mode")?;

    let entry_mode = EntryMode::from_db_str(&mode_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            Box::new(AppError::Other(format!("Invalid entry mode: {}", mode_str))),
        )
    })?;

    Ok(TimeEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        start_time: parse_instant(2, &start)?,
        end_time: parse_optional_instant(3, end)?,
        project_id: row.get("project_id")?,
        category_id: row.get("category_id")?,
        description: row.get("description")?,
        entry_mode,
    })
}

/// The user's open simple-mode entry, if any.
pub fn find_active(conn: &Connection, user_id: &str) -> AppResult<Option<TimeEntry>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM time_entries
         WHERE user_id = ?1 AND entry_mode = 'simple' AND end_time IS NULL
         ORDER BY start_time DESC
         LIMIT 1"
    );
    Ok(conn.query_row(&sql, [user_id], map_row).optional()?)
}

/// Insert a new entry and return its id.
pub fn insert(conn: &Connection, entry: &TimeEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_entries (user_id, start_time, end_time, project_id, category_id, description, entry_mode)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.user_id,
            fmt_instant(&entry.start_time),
            entry.end_time.as_ref().map(fmt_instant),
            entry.project_id,
            entry.category_id,
            entry.description,
            entry.entry_mode.to_db_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Close an entry and store its (possibly updated) tags.
pub fn close(conn: &Connection, entry: &TimeEntry, end_time: DateTime<Utc>) -> AppResult<()> {
    conn.execute(
        "UPDATE time_entries
         SET end_time = ?1, project_id = ?2, category_id = ?3, description = ?4
         WHERE id = ?5",
        params![
            fmt_instant(&end_time),
            entry.project_id,
            entry.category_id,
            entry.description,
            entry.id,
        ],
    )?;
    Ok(())
}

/// Most recent entries of a user, newest first.
pub fn list_recent(conn: &Connection, user_id: &str, limit: usize) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM time_entries
         WHERE user_id = ?1
         ORDER BY start_time DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, limit as i64], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
