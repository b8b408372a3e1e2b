use super::{fmt_instant, parse_instant};
use crate::errors::AppResult;
use crate::models::block::{Block, NewBlock};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<Block> {
    let start: String = row.get("start_time")?;
    let end: String = row.get("end_time")?;

    Ok(Block {
        id: row.get("id")?,
        day_id: row.get("day_id")?,
        start_time: parse_instant(2, &start)?,
        end_time: parse_instant(3, &end)?,
        project_id: row.get("project_id")?,
        category_id: row.get("category_id")?,
        description: row.get("description")?,
    })
}

/// All blocks of a day, ordered by start time.
pub fn load_for_day(conn: &Connection, day_id: i64) -> AppResult<Vec<Block>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, day_id, start_time, end_time, project_id, category_id, description
         FROM blocks
         WHERE day_id = ?1
         ORDER BY start_time ASC, id ASC",
    )?;

    let rows = stmt.query_map([day_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Block `id` together with the owner of its day, restricted to `user_id`.
pub fn get_owned(conn: &Connection, user_id: &str, id: i64) -> AppResult<Option<Block>> {
    Ok(conn
        .query_row(
            "SELECT b.id, b.day_id, b.start_time, b.end_time, b.project_id, b.category_id, b.description
             FROM blocks b
             JOIN days d ON d.id = b.day_id
             WHERE b.id = ?1 AND d.user_id = ?2",
            params![id, user_id],
            map_row,
        )
        .optional()?)
}

pub fn insert(conn: &Connection, block: &NewBlock) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO blocks (day_id, start_time, end_time, project_id, category_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            block.day_id,
            fmt_instant(&block.start_time),
            fmt_instant(&block.end_time),
            block.project_id,
            block.category_id,
            block.description,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update all fields except id and day.
pub fn update(conn: &Connection, block: &Block) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE blocks
         SET start_time = ?1, end_time = ?2,
             project_id = ?3, category_id = ?4, description = ?5
         WHERE id = ?6",
        params![
            fmt_instant(&block.start_time),
            fmt_instant(&block.end_time),
            block.project_id,
            block.category_id,
            block.description,
            block.id,
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM blocks WHERE id = ?1", [id])?)
}
