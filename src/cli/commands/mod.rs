pub mod block;
pub mod config;
pub mod day;
pub mod init;
pub mod log;
pub mod template;
pub mod timer;

use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::caller::Caller;
use serde::Serialize;

/// Open the configured database with the configured busy timeout.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let path = cfg.database_path();
    DbPool::with_busy_timeout(&path.to_string_lossy(), cfg.busy_timeout_ms)
}

/// The acting user, stamped with the current instant.
pub(crate) fn caller(cfg: &Config) -> Caller {
    Caller::new(cfg.default_user.as_str())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
