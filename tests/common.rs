#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rtimeblocks::db::pool::DbPool;
use rtimeblocks::models::caller::Caller;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rtb() -> Command {
    cargo_bin_cmd!("rtimeblocks")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimeblocks.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        fs::remove_file(format!("{db_path}{suffix}")).ok();
    }
    db_path
}

/// Run `init` in test mode against `db_path`.
pub fn init_cli_db(db_path: &str) {
    rtb()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

pub fn memory_pool() -> DbPool {
    DbPool::in_memory().expect("in-memory db")
}

pub fn instant(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid datetime")
        .with_timezone(&Utc)
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

/// `user` acting at the fixed instant `now`.
pub fn caller_at(user: &str, now: &str) -> Caller {
    Caller::at(user, instant(now))
}

/// `caller` moved `minutes` later.
pub fn later(caller: &Caller, minutes: i64) -> Caller {
    Caller::at(caller.user_id.clone(), caller.now + Duration::minutes(minutes))
}
