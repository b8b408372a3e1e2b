//! Schema migrations.
//!
//! Applied migrations are recorded as `migration_applied` rows in the
//! internal `log` table, so running this module again is a no-op.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20260101_0001_time_entries",
        description: "Created time_entries with one active simple timer per user",
        sql: r#"
        CREATE TABLE IF NOT EXISTS time_entries (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      TEXT NOT NULL,
            start_time   TEXT NOT NULL,          -- RFC 3339 UTC, millis, 'Z'
            end_time     TEXT,                   -- NULL while running
            project_id   INTEGER,
            category_id  INTEGER,
            description  TEXT,
            entry_mode   TEXT NOT NULL DEFAULT 'simple'
                         CHECK (entry_mode IN ('simple','day','template')),
            CHECK (end_time IS NULL OR end_time > start_time)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_time_entries_one_active
            ON time_entries(user_id)
            WHERE end_time IS NULL AND entry_mode = 'simple';

        CREATE INDEX IF NOT EXISTS idx_time_entries_user_start
            ON time_entries(user_id, start_time);
        "#,
    },
    Migration {
        version: "20260101_0002_days_blocks",
        description: "Created days and blocks with per-day overlap exclusion",
        sql: r#"
        CREATE TABLE IF NOT EXISTS days (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      TEXT NOT NULL,
            date         TEXT NOT NULL,          -- YYYY-MM-DD
            start_time   TEXT NOT NULL,
            end_time     TEXT,
            description  TEXT,
            UNIQUE (user_id, date),
            CHECK (end_time IS NULL OR end_time > start_time)
        );

        CREATE TABLE IF NOT EXISTS blocks (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            day_id       INTEGER NOT NULL REFERENCES days(id) ON DELETE CASCADE,
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            project_id   INTEGER,
            category_id  INTEGER,
            description  TEXT,
            CHECK (end_time > start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_blocks_day_start ON blocks(day_id, start_time);

        CREATE TRIGGER IF NOT EXISTS trg_blocks_no_overlap_insert
        BEFORE INSERT ON blocks
        WHEN EXISTS (
            SELECT 1 FROM blocks b
            WHERE b.day_id = NEW.day_id
              AND b.start_time < NEW.end_time
              AND NEW.start_time < b.end_time
        )
        BEGIN
            SELECT RAISE(ABORT, 'BLOCK_OVERLAP');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_blocks_no_overlap_update
        BEFORE UPDATE OF day_id, start_time, end_time ON blocks
        WHEN EXISTS (
            SELECT 1 FROM blocks b
            WHERE b.day_id = NEW.day_id
              AND b.id <> NEW.id
              AND b.start_time < NEW.end_time
              AND NEW.start_time < b.end_time
        )
        BEGIN
            SELECT RAISE(ABORT, 'BLOCK_OVERLAP');
        END;
        "#,
    },
    Migration {
        version: "20260101_0003_templates",
        description: "Created templates and template_entries",
        sql: r#"
        CREATE TABLE IF NOT EXISTS templates (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      TEXT NOT NULL,
            name         TEXT NOT NULL,
            description  TEXT,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS template_entries (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id  INTEGER NOT NULL REFERENCES templates(id) ON DELETE CASCADE,
            position     INTEGER NOT NULL,
            start_minute INTEGER NOT NULL CHECK (start_minute BETWEEN 0 AND 1439),
            end_minute   INTEGER NOT NULL CHECK (end_minute BETWEEN 0 AND 1439),
            project_id   INTEGER,
            category_id  INTEGER,
            description  TEXT,
            CHECK (end_minute > start_minute)
        );

        CREATE INDEX IF NOT EXISTS idx_templates_user ON templates(user_id);
        CREATE INDEX IF NOT EXISTS idx_template_entries_template
            ON template_entries(template_id, position);
        "#,
    },
];

/// Ensure that the `log` table exists; it also stores migration bookkeeping.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Apply one migration under the write lock. The applied check is repeated
/// inside the lock, so concurrent openers apply each version once.
fn apply(conn: &mut Connection, migration: &Migration) -> AppResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if is_applied(&tx, migration.version)? {
        return Ok(());
    }

    tx.execute_batch(migration.sql).map_err(|e| {
        AppError::Migration(format!("{} failed: {}", migration.version, e))
    })?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), 'migration_applied', ?1, ?2)",
        [migration.version, migration.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Public entry point: run all pending migrations, in order.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &mut Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for migration in MIGRATIONS {
        if !is_applied(conn, migration.version)? {
            apply(conn, migration)?;
        }
    }

    Ok(())
}

/// Versions already applied to this database, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&mut conn).unwrap();
        run_pending_migrations(&mut conn).unwrap();

        let versions = applied_versions(&conn).unwrap();
        assert_eq!(versions.len(), MIGRATIONS.len());
        assert_eq!(versions[0], "20260101_0001_time_entries");
    }

    #[test]
    fn overlap_trigger_rejects_direct_inserts() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO days (user_id, date, start_time) VALUES ('u', '2026-02-10', '2026-02-10T08:00:00.000Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO blocks (day_id, start_time, end_time)
             VALUES (1, '2026-02-10T09:00:00.000Z', '2026-02-10T10:00:00.000Z')",
            [],
        )
        .unwrap();

        let touching = conn.execute(
            "INSERT INTO blocks (day_id, start_time, end_time)
             VALUES (1, '2026-02-10T10:00:00.000Z', '2026-02-10T11:00:00.000Z')",
            [],
        );
        assert!(touching.is_ok());

        let err = conn
            .execute(
                "INSERT INTO blocks (day_id, start_time, end_time)
                 VALUES (1, '2026-02-10T09:30:00.000Z', '2026-02-10T10:30:00.000Z')",
                [],
            )
            .unwrap_err();
        assert!(err.to_string().contains("BLOCK_OVERLAP"));
    }

    #[test]
    fn only_one_open_simple_entry_per_user() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&mut conn).unwrap();

        let insert = "INSERT INTO time_entries (user_id, start_time, entry_mode) VALUES (?1, ?2, 'simple')";
        conn.execute(insert, ["alice", "2026-02-10T09:00:00.000Z"]).unwrap();
        conn.execute(insert, ["bob", "2026-02-10T09:00:00.000Z"]).unwrap();
        assert!(conn.execute(insert, ["alice", "2026-02-10T09:05:00.000Z"]).is_err());
    }
}
