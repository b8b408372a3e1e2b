//! Row mapping and SQL for the engine's tables.
//!
//! Every function takes `&Connection`, so it works the same on a plain
//! connection and inside a `Transaction` (which derefs to one).

pub mod blocks;
pub mod days;
pub mod templates;
pub mod time_entries;

use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;

/// Canonical storage form of an instant: RFC 3339, UTC, millisecond
/// precision, `Z` suffix. All instants share this shape, so comparing the
/// stored text compares the instants.
pub fn fmt_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn fmt_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn parse_instant(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(idx, AppError::InvalidInstant(raw.to_string())))
}

pub(crate) fn parse_optional_instant(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_instant(idx, &s)).transpose()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| conversion_error(idx, AppError::InvalidDate(raw.to_string())))
}

/// Whether `err` is the abort raised by the block overlap triggers.
pub fn is_overlap_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("BLOCK_OVERLAP"))
}

/// Whether `err` is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stored_instants_sort_chronologically() {
        let a = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(1500);
        assert_eq!(fmt_instant(&a), "2026-02-10T09:00:00.000Z");
        assert!(fmt_instant(&a) < fmt_instant(&b));
        assert_eq!(parse_instant(0, &fmt_instant(&b)).unwrap(), b);
    }
}
