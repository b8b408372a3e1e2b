//! rTimeblocks library root.
//! Exposes the CLI parser, the run() entry point and the time-tracking engine.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Timer { action } => cli::commands::timer::handle(action, cfg, cli.json),
        Commands::Day { action } => cli::commands::day::handle(action, cfg, cli.json),
        Commands::Block { action } => cli::commands::block::handle(action, cfg, cli.json),
        Commands::Template { action } => cli::commands::template::handle(action, cfg, cli.json),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(user) = &cli.user {
        cfg.default_user = user.clone();
    }

    dispatch(&cli, &cfg)
}
