//! Unified application error type.
//! Every layer (validation, db, core, cli) returns AppError so callers can
//! map failures onto the same taxonomy: validation, conflict, not found,
//! storage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

use crate::models::time_of_day::TimeOfDay;

/// Coarse error category exposed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    Conflict,
    NotFound,
    StorageError,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::StorageError => "STORAGE_ERROR",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The block a candidate interval collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockConflict {
    pub block_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl fmt::Display for BlockConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block #{} ({} → {})",
            self.block_id,
            self.start_time.format("%Y-%m-%d %H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Two entries of the same template that collide once projected on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCollision {
    pub first: (TimeOfDay, TimeOfDay),
    pub second: (TimeOfDay, TimeOfDay),
}

impl fmt::Display for EntryCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template entries {}-{} and {}-{}",
            self.first.0, self.first.1, self.second.0, self.second.1
        )
    }
}

/// What a BLOCK_OVERLAP conflict collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OverlapSource {
    Existing(BlockConflict),
    Template(EntryCollision),
}

impl fmt::Display for OverlapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapSource::Existing(b) => write!(f, "overlaps existing {}", b),
            OverlapSource::Template(c) => write!(f, "{} overlap each other", c),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Storage
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Validation
    // ---------------------------
    #[error("Invalid time format: '{0}' (expected HH:MM, 00:00-23:59)")]
    InvalidTime(String),

    #[error("Invalid timestamp: '{0}' (expected RFC 3339, e.g. 2026-02-10T09:00:00Z)")]
    InvalidInstant(String),

    #[error("Invalid date format: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid range: end {end} must be after start {start}")]
    InvalidRange { start: String, end: String },

    #[error("Date '{date}' is not a calendar date within {window_months} months of {today}")]
    DateOutOfRange {
        date: String,
        today: String,
        window_months: u32,
    },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    // ---------------------------
    // Conflicts
    // ---------------------------
    #[error("An active timer already exists (entry #{entry_id}, started {started_at})")]
    ActiveTimerExists {
        entry_id: i64,
        started_at: DateTime<Utc>,
    },

    #[error("Day {date} already started (day #{day_id})")]
    DayAlreadyStarted { day_id: i64, date: String },

    #[error("Day #{0} already ended")]
    DayAlreadyEnded(i64),

    #[error("Block {start_time} → {end_time} {collides_with}")]
    BlockOverlap {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        collides_with: OverlapSource,
    },

    // ---------------------------
    // Not found
    // ---------------------------
    #[error("No active timer")]
    NoActiveTimer,

    #[error("Day #{0} not found")]
    DayNotFound(i64),

    #[error("Block #{0} not found")]
    BlockNotFound(i64),

    #[error("Template #{0} not found")]
    TemplateNotFound(i64),

    // ---------------------------
    // Config
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Output
    // ---------------------------
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidTime(_)
            | AppError::InvalidInstant(_)
            | AppError::InvalidDate(_)
            | AppError::InvalidRange { .. }
            | AppError::DateOutOfRange { .. }
            | AppError::InvalidName(_) => ErrorKind::ValidationError,

            AppError::ActiveTimerExists { .. }
            | AppError::DayAlreadyStarted { .. }
            | AppError::DayAlreadyEnded(_)
            | AppError::BlockOverlap { .. } => ErrorKind::Conflict,

            AppError::NoActiveTimer
            | AppError::DayNotFound(_)
            | AppError::BlockNotFound(_)
            | AppError::TemplateNotFound(_) => ErrorKind::NotFound,

            AppError::Db(_) | AppError::Migration(_) => ErrorKind::StorageError,

            AppError::Io(_)
            | AppError::Config(_)
            | AppError::ConfigParse(_)
            | AppError::Json(_)
            | AppError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code, e.g. `BLOCK_OVERLAP`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Db(_) => "STORAGE_ERROR",
            AppError::Migration(_) => "MIGRATION_FAILED",
            AppError::InvalidTime(_) => "INVALID_TIME",
            AppError::InvalidInstant(_) => "INVALID_INSTANT",
            AppError::InvalidDate(_) => "INVALID_DATE",
            AppError::InvalidRange { .. } => "INVALID_RANGE",
            AppError::DateOutOfRange { .. } => "DATE_OUT_OF_RANGE",
            AppError::InvalidName(_) => "INVALID_NAME",
            AppError::ActiveTimerExists { .. } => "ACTIVE_TIMER_EXISTS",
            AppError::DayAlreadyStarted { .. } => "DAY_ALREADY_STARTED",
            AppError::DayAlreadyEnded(_) => "DAY_ALREADY_ENDED",
            AppError::BlockOverlap { .. } => "BLOCK_OVERLAP",
            AppError::NoActiveTimer => "NO_ACTIVE_TIMER",
            AppError::DayNotFound(_) => "DAY_NOT_FOUND",
            AppError::BlockNotFound(_) => "BLOCK_NOT_FOUND",
            AppError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            AppError::Config(_) | AppError::ConfigParse(_) => "CONFIG_ERROR",
            AppError::Json(_) => "SERIALIZATION_ERROR",
            AppError::Other(_) => "INTERNAL",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
