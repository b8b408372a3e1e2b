use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// Creates the config directory and file (skipped with `--test`), opens the
/// database and applies every pending migration.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.user.as_deref(), cli.test)?;
    let db_path = cfg.database_path();

    println!("⚙️  Initializing rTimeblocks…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", db_path.display());
    println!("👤 User       : {}", cfg.default_user);

    let pool = DbPool::with_busy_timeout(&db_path.to_string_lossy(), cfg.busy_timeout_ms)?;
    let versions = applied_versions(&pool.conn)?;

    // The audit line is informative only; a failure here must not fail init.
    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", db_path.display()),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    success(format!(
        "Database initialized ({} migrations applied)",
        versions.len()
    ));
    Ok(())
}
