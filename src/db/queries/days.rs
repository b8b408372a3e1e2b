use super::{fmt_date, fmt_instant, parse_date, parse_instant, parse_optional_instant};
use crate::errors::AppResult;
use crate::models::day::Day;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, user_id, date, start_time, end_time, description";

pub fn map_row(row: &Row) -> rusqlite::Result<Day> {
    let date: String = row.get("date")?;
    let start: String = row.get("start_time")?;
    let end: Option<String> = row.get("end_time")?;

    Ok(Day {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: parse_date(2, &date)?,
        start_time: parse_instant(3, &start)?,
        end_time: parse_optional_instant(4, end)?,
        description: row.get("description")?,
    })
}

/// Day `id`, only if it belongs to `user_id`.
pub fn get_owned(conn: &Connection, user_id: &str, id: i64) -> AppResult<Option<Day>> {
    let sql = format!("SELECT {COLUMNS} FROM days WHERE id = ?1 AND user_id = ?2");
    Ok(conn.query_row(&sql, params![id, user_id], map_row).optional()?)
}

pub fn find_by_date(conn: &Connection, user_id: &str, date: &NaiveDate) -> AppResult<Option<Day>> {
    let sql = format!("SELECT {COLUMNS} FROM days WHERE user_id = ?1 AND date = ?2");
    Ok(conn
        .query_row(&sql, params![user_id, fmt_date(date)], map_row)
        .optional()?)
}

pub fn insert(conn: &Connection, day: &Day) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO days (user_id, date, start_time, end_time, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            day.user_id,
            fmt_date(&day.date),
            fmt_instant(&day.start_time),
            day.end_time.as_ref().map(fmt_instant),
            day.description,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_end_time(conn: &Connection, id: i64, end_time: DateTime<Utc>) -> AppResult<()> {
    conn.execute(
        "UPDATE days SET end_time = ?1 WHERE id = ?2",
        params![fmt_instant(&end_time), id],
    )?;
    Ok(())
}
