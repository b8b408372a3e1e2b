use super::entry_mode::EntryMode;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>, // None while the timer runs
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub entry_mode: EntryMode,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed time, measured up to `now` while still running.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }
}

/// Optional tags supplied when starting or stopping a timer.
/// On stop, only the fields that are `Some` overwrite the stored values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryFields {
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl EntryFields {
    pub fn merge_into(self, entry: &mut TimeEntry) {
        if let Some(p) = self.project_id {
            entry.project_id = Some(p);
        }
        if let Some(c) = self.category_id {
            entry.category_id = Some(c);
        }
        if let Some(d) = self.description {
            entry.description = Some(d);
        }
    }
}
