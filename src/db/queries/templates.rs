use super::{fmt_instant, parse_instant};
use crate::errors::{AppError, AppResult};
use crate::models::template::{Template, TemplateEntry};
use crate::models::time_of_day::TimeOfDay;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn minutes_to_time(idx: usize, raw: i64) -> rusqlite::Result<TimeOfDay> {
    u16::try_from(raw)
        .ok()
        .and_then(TimeOfDay::from_minutes)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Integer,
                Box::new(AppError::InvalidTime(format!("{raw} minutes"))),
            )
        })
}

fn map_entry(row: &Row) -> rusqlite::Result<TemplateEntry> {
    Ok(TemplateEntry {
        start_time: minutes_to_time(0, row.get("start_minute")?)?,
        end_time: minutes_to_time(1, row.get("end_minute")?)?,
        project_id: row.get("project_id")?,
        category_id: row.get("category_id")?,
        description: row.get("description")?,
    })
}

/// Template header row; entries are loaded separately.
fn map_header(row: &Row) -> rusqlite::Result<Template> {
    let created_at: String = row.get("created_at")?;
    Ok(Template {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        entries: Vec::new(),
        created_at: parse_instant(4, &created_at)?,
    })
}

pub fn load_entries(conn: &Connection, template_id: i64) -> AppResult<Vec<TemplateEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT start_minute, end_minute, project_id, category_id, description
         FROM template_entries
         WHERE template_id = ?1
         ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([template_id], map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Template `id` with its entries, only if owned by `user_id`.
pub fn get_owned(conn: &Connection, user_id: &str, id: i64) -> AppResult<Option<Template>> {
    let header = conn
        .query_row(
            "SELECT id, user_id, name, description, created_at
             FROM templates WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            map_header,
        )
        .optional()?;

    match header {
        Some(mut template) => {
            template.entries = load_entries(conn, template.id)?;
            Ok(Some(template))
        }
        None => Ok(None),
    }
}

pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<Template>> {
    let headers: Vec<Template> = {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, created_at
             FROM templates WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?;
        let rows = stmt.query_map([user_id], map_header)?;
        let mut v = Vec::new();
        for r in rows {
            v.push(r?);
        }
        v
    };

    let mut out = Vec::with_capacity(headers.len());
    for mut template in headers {
        template.entries = load_entries(conn, template.id)?;
        out.push(template);
    }
    Ok(out)
}

/// Insert header + entries; returns the new template id.
pub fn insert(conn: &Connection, template: &Template) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO templates (user_id, name, description, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            template.user_id,
            template.name,
            template.description,
            fmt_instant(&template.created_at),
        ],
    )?;
    let id = conn.last_insert_rowid();
    insert_entries(conn, id, &template.entries)?;
    Ok(id)
}

pub fn update_header(conn: &Connection, template: &Template) -> AppResult<()> {
    conn.execute(
        "UPDATE templates SET name = ?1, description = ?2 WHERE id = ?3",
        params![template.name, template.description, template.id],
    )?;
    Ok(())
}

/// Drop every entry of the template and store `entries` in their place.
pub fn replace_entries(conn: &Connection, template_id: i64, entries: &[TemplateEntry]) -> AppResult<()> {
    conn.execute("DELETE FROM template_entries WHERE template_id = ?1", [template_id])?;
    insert_entries(conn, template_id, entries)
}

fn insert_entries(conn: &Connection, template_id: i64, entries: &[TemplateEntry]) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO template_entries
             (template_id, position, start_minute, end_minute, project_id, category_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, e) in entries.iter().enumerate() {
        stmt.execute(params![
            template_id,
            position as i64,
            e.start_time.minutes(),
            e.end_time.minutes(),
            e.project_id,
            e.category_id,
            e.description,
        ])?;
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM templates WHERE id = ?1", [id])?)
}
