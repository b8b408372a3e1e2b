//! Format and ordering checks on instants, dates and time-of-day values.
//!
//! Each check is a small named function returning `AppResult`; callers
//! compose them explicitly in the order they need.

use crate::errors::{AppError, AppResult};
use crate::models::time_of_day::TimeOfDay;
use chrono::{DateTime, Months, NaiveDate, Timelike, Utc};
use regex::Regex;
use std::fmt::Display;
use std::sync::OnceLock;

fn hhmm_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])$").expect("valid HH:MM regex"))
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

/// Parse a strict 24-hour `HH:MM` value (00:00–23:59).
pub fn validate_time_of_day(value: &str) -> AppResult<TimeOfDay> {
    let caps = hhmm_regex()
        .captures(value)
        .ok_or_else(|| AppError::InvalidTime(value.to_string()))?;

    let hour: u16 = caps[1].parse().map_err(|_| AppError::InvalidTime(value.into()))?;
    let minute: u16 = caps[2].parse().map_err(|_| AppError::InvalidTime(value.into()))?;

    TimeOfDay::from_hm(hour, minute).ok_or_else(|| AppError::InvalidTime(value.to_string()))
}

/// Parse an absolute RFC 3339 timestamp (offset required) into UTC.
/// Fractions finer than a millisecond are rejected; the store keeps millis.
pub fn validate_instant(value: &str) -> AppResult<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(value.trim())
        .map_err(|_| AppError::InvalidInstant(value.to_string()))?;
    if dt.nanosecond() % 1_000_000 != 0 {
        return Err(AppError::InvalidInstant(value.to_string()));
    }
    Ok(dt.with_timezone(&Utc))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> AppResult<NaiveDate> {
    if !date_regex().is_match(value) {
        return Err(AppError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(value.into()))
}

/// `end` must be strictly after `start`.
pub fn require_ordered<T: PartialOrd + Display>(start: &T, end: &T) -> AppResult<()> {
    if end > start {
        Ok(())
    } else {
        Err(AppError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}

/// `date` must lie within `window_months` calendar months of `today`, in
/// either direction. Bounds are inclusive; chrono clamps a month-end that
/// does not exist (2028-02-29 minus 12 months is 2027-02-28).
pub fn require_within_window(date: NaiveDate, today: NaiveDate, window_months: u32) -> AppResult<()> {
    let months = Months::new(window_months);
    let lower = today.checked_sub_months(months).unwrap_or(NaiveDate::MIN);
    let upper = today.checked_add_months(months).unwrap_or(NaiveDate::MAX);
    if (lower..=upper).contains(&date) {
        Ok(())
    } else {
        Err(out_of_range(&date.to_string(), today, window_months))
    }
}

/// Target date of a template application: any value that is not a
/// calendar date inside the window is DATE_OUT_OF_RANGE.
pub fn validate_apply_date(value: &str, today: NaiveDate, window_months: u32) -> AppResult<NaiveDate> {
    let date = validate_date(value).map_err(|_| out_of_range(value, today, window_months))?;
    require_within_window(date, today, window_months)?;
    Ok(date)
}

fn out_of_range(date: &str, today: NaiveDate, window_months: u32) -> AppError {
    AppError::DateOutOfRange {
        date: date.to_string(),
        today: today.to_string(),
        window_months,
    }
}

pub fn require_name(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidName("name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Format + ordering check for a pair of instants.
pub fn validate_instant_range(start: &str, end: &str) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let s = validate_instant(start)?;
    let e = validate_instant(end)?;
    require_ordered(&s, &e)?;
    Ok((s, e))
}

/// Format + ordering check for a pair of time-of-day values.
pub fn validate_time_of_day_range(start: &str, end: &str) -> AppResult<(TimeOfDay, TimeOfDay)> {
    let s = validate_time_of_day(start)?;
    let e = validate_time_of_day(end)?;
    require_ordered(&s, &e)?;
    Ok((s, e))
}
