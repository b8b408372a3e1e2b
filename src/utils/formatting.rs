//! Formatting helpers for CLI output.

use chrono::{DateTime, Utc};

/// `mins` as `02h 25m`, or `02:25` when `short`.
pub fn mins2readable(mins: i64, short: bool) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let abs_m = mins.abs();
    let hours = abs_m / 60;
    let minutes = abs_m % 60;

    if short {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}h {:02}m", sign, hours, minutes)
    }
}

/// Instant as `YYYY-MM-DD HH:MM` (UTC).
pub fn fmt_instant_short(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Interval as `HH:MM → HH:MM`, with the end date added when it differs.
pub fn fmt_span(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    if start.date_naive() == end.date_naive() {
        format!("{} → {}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{} → {}", start.format("%H:%M"), end.format("%Y-%m-%d %H:%M"))
    }
}

pub fn opt_or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
