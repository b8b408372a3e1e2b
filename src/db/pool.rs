//! SQLite connection wrapper (one connection per unit of work).

use crate::db::initialize::init_db;
use crate::errors::AppResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn new(path: &str) -> AppResult<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn with_busy_timeout(path: &str, busy_timeout_ms: u64) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        // Busy timeout first: switching to WAL needs the lock too.
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::prepare(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
        Self::prepare(conn)
    }

    fn prepare(mut conn: Connection) -> AppResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        init_db(&mut conn)?;
        Ok(Self { conn })
    }

    /// Start a write transaction that takes SQLite's write lock up front.
    ///
    /// Every check-then-write sequence runs inside one of these, so two
    /// connections can never both pass a check before either write lands.
    pub fn write_tx(&mut self) -> AppResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}
