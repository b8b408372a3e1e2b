use crate::cli::commands::{caller, open_pool, print_json};
use crate::cli::parser::{FieldArgs, TimerAction};
use crate::config::Config;
use crate::core::timer::TimerLogic;
use crate::errors::AppResult;
use crate::models::time_entry::{EntryFields, TimeEntry};
use crate::ui::messages::{info, success};
use crate::utils::formatting::{fmt_instant_short, opt_or_dash};
use crate::utils::mins2readable;
use crate::utils::table::Table;
use chrono::{DateTime, Utc};

impl From<&FieldArgs> for EntryFields {
    fn from(args: &FieldArgs) -> Self {
        EntryFields {
            project_id: args.project,
            category_id: args.category,
            description: args.desc.clone(),
        }
    }
}

fn print_entry(entry: &TimeEntry, now: DateTime<Utc>) {
    println!("  entry     : #{}", entry.id);
    println!("  started   : {}", fmt_instant_short(&entry.start_time));
    if let Some(end) = &entry.end_time {
        println!("  stopped   : {}", fmt_instant_short(end));
    }
    println!(
        "  duration  : {}",
        mins2readable(entry.duration(now).num_minutes(), false)
    );
    println!("  project   : {}", opt_or_dash(entry.project_id));
    println!("  category  : {}", opt_or_dash(entry.category_id));
    println!("  note      : {}", opt_or_dash(entry.description.as_deref()));
}

fn print_entries(entries: &[TimeEntry], now: DateTime<Utc>) {
    if entries.is_empty() {
        info("No entries");
        return;
    }
    let mut table = Table::new(["ID", "START", "END", "DURATION", "PROJECT", "NOTE"]);
    for e in entries {
        table.add_row(vec![
            e.id.to_string(),
            fmt_instant_short(&e.start_time),
            e.end_time
                .as_ref()
                .map_or_else(|| "running".to_string(), fmt_instant_short),
            mins2readable(e.duration(now).num_minutes(), true),
            opt_or_dash(e.project_id),
            opt_or_dash(e.description.as_deref()),
        ]);
    }
    print!("{}", table.render());
}

pub fn handle(action: &TimerAction, cfg: &Config, json: bool) -> AppResult<()> {
    let mut pool = open_pool(cfg)?;
    let caller = caller(cfg);

    match action {
        TimerAction::Start(fields) => {
            let entry = TimerLogic::start(&mut pool, &caller, fields.into())?;
            if json {
                return print_json(&entry);
            }
            success(format!(
                "Timer started at {} (entry #{})",
                fmt_instant_short(&entry.start_time),
                entry.id
            ));
        }
        TimerAction::Stop(fields) => {
            let entry = TimerLogic::stop(&mut pool, &caller, fields.into())?;
            if json {
                return print_json(&entry);
            }
            success("Timer stopped");
            print_entry(&entry, caller.now);
        }
        TimerAction::Status => {
            let active = TimerLogic::active(&pool, &caller)?;
            if json {
                return print_json(&active);
            }
            match active {
                Some(entry) => {
                    info("Timer running");
                    print_entry(&entry, caller.now);
                }
                None => info("No timer running"),
            }
        }
        TimerAction::List { limit } => {
            let entries = TimerLogic::recent(&pool, &caller, *limit)?;
            if json {
                return print_json(&entries);
            }
            print_entries(&entries, caller.now);
        }
    }

    Ok(())
}
