//! Time-of-day value used by templates.
//!
//! A `TimeOfDay` is a number of minutes since midnight (0..=1439). It is not
//! an instant and cannot be compared with one: to place it on the calendar,
//! combine it with a date through [`TimeOfDay::on`].

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    /// Wall-clock time of an instant, truncated to the minute (UTC).
    pub fn from_instant(instant: &DateTime<Utc>) -> Self {
        Self((instant.hour() * 60 + instant.minute()) as u16)
    }

    /// Wall-clock time of an instant, rounded up to the next whole minute.
    /// `None` when that reaches midnight.
    pub fn ceil_instant(instant: &DateTime<Utc>) -> Option<Self> {
        let floor = Self::from_instant(instant);
        if instant.second() == 0 && instant.nanosecond() == 0 {
            Some(floor)
        } else {
            Self::from_minutes(floor.0 + 1)
        }
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Absolute instant for this time of day on `date` (UTC).
    pub fn on(&self, date: NaiveDate) -> DateTime<Utc> {
        let time = NaiveTime::from_hms_opt(self.hour() as u32, self.minute() as u32, 0)
            .unwrap_or(NaiveTime::MIN);
        Utc.from_utc_datetime(&date.and_time(time))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
