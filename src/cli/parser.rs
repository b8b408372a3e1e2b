use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rTimeblocks
#[derive(Parser)]
#[command(
    name = "rtimeblocks",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track worked time with a start/stop timer, day blocks and reusable day templates on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this user instead of `default_user` from the configuration
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(global = true, long = "json")]
    pub json: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Optional attributes shared by timers and blocks.
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long = "project", help = "Project id")]
    pub project: Option<i64>,

    #[arg(long = "category", help = "Category id")]
    pub category: Option<i64>,

    #[arg(long = "desc", help = "Free-text description")]
    pub desc: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the effective configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Simple mode: a single start/stop timer
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Day mode: start or end a day, or show its blocks
    Day {
        #[command(subcommand)]
        action: DayAction,
    },

    /// Add, edit or delete blocks inside a day
    Block {
        #[command(subcommand)]
        action: BlockAction,
    },

    /// Manage reusable day templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer now
    Start(FieldArgs),
    /// Stop the running timer; given fields overwrite the stored ones
    Stop(FieldArgs),
    /// Show the running timer, if any
    Status,
    /// List the latest timer entries
    List {
        #[arg(long = "limit", default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum DayAction {
    /// Open the day for DATE (YYYY-MM-DD)
    Start {
        date: String,
        #[arg(long = "desc")]
        desc: Option<String>,
    },
    /// Close an open day
    End { day_id: i64 },
    /// Show the day recorded for DATE and its blocks
    Show { date: String },
}

#[derive(Subcommand)]
pub enum BlockAction {
    /// Add a block; START and END are RFC 3339 timestamps
    Add {
        day_id: i64,
        start: String,
        end: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change some fields of a block
    Edit {
        block_id: i64,
        #[arg(long = "start")]
        start: Option<String>,
        #[arg(long = "end")]
        end: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a block
    Del { block_id: i64 },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Create a template from `--entry HH:MM-HH:MM[=description]` values
    Create {
        name: String,
        #[arg(long = "entry", value_name = "HH:MM-HH:MM")]
        entries: Vec<String>,
        #[arg(long = "desc")]
        desc: Option<String>,
    },
    /// Create a template mirroring the blocks of a day
    FromDay {
        day_id: i64,
        name: String,
        #[arg(long = "desc")]
        desc: Option<String>,
    },
    /// Rename, re-describe or replace the entries of a template
    Update {
        id: i64,
        #[arg(long = "name")]
        name: Option<String>,
        #[arg(long = "desc")]
        desc: Option<String>,
        #[arg(long = "entry", value_name = "HH:MM-HH:MM")]
        entries: Vec<String>,
        #[arg(long = "clear-entries", conflicts_with = "entries")]
        clear_entries: bool,
    },
    /// List your templates
    List,
    /// Show one template with its entries
    Show { id: i64 },
    /// Delete a template
    Del { id: i64 },
    /// Expand a template onto DATE (YYYY-MM-DD) as new blocks
    Apply { id: i64, date: String },
}
