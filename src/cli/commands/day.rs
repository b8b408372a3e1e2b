use crate::cli::commands::{caller, open_pool, print_json};
use crate::cli::parser::DayAction;
use crate::config::Config;
use crate::core::day::DayLogic;
use crate::core::validation::validate_date;
use crate::errors::AppResult;
use crate::models::block::Block;
use crate::models::day::Day;
use crate::ui::messages::{header, info, success};
use crate::utils::formatting::{fmt_instant_short, fmt_span, opt_or_dash};
use crate::utils::mins2readable;
use crate::utils::table::Table;
use serde_json::json;

/// Blocks as a table, with a total line.
pub(crate) fn print_blocks(blocks: &[Block]) {
    if blocks.is_empty() {
        info("No blocks");
        return;
    }

    let mut table = Table::new(["ID", "SPAN", "DURATION", "PROJECT", "CATEGORY", "NOTE"]);
    let mut total = 0;
    for b in blocks {
        let minutes = (b.end_time - b.start_time).num_minutes();
        total += minutes;
        table.add_row(vec![
            b.id.to_string(),
            fmt_span(&b.start_time, &b.end_time),
            mins2readable(minutes, true),
            opt_or_dash(b.project_id),
            opt_or_dash(b.category_id),
            opt_or_dash(b.description.as_deref()),
        ]);
    }
    print!("{}", table.render());
    println!("\nTotal: {}", mins2readable(total, false));
}

fn print_day(day: &Day) {
    header(format!("Day {} (#{})", day.date_str(), day.id));
    println!("  started : {}", fmt_instant_short(&day.start_time));
    println!(
        "  ended   : {}",
        opt_or_dash(day.end_time.as_ref().map(fmt_instant_short))
    );
    if let Some(d) = &day.description {
        println!("  note    : {}", d);
    }
    println!();
}

pub fn handle(action: &DayAction, cfg: &Config, json: bool) -> AppResult<()> {
    let mut pool = open_pool(cfg)?;
    let caller = caller(cfg);

    match action {
        DayAction::Start { date, desc } => {
            let date = validate_date(date)?;
            let day = DayLogic::start_day(&mut pool, &caller, date, desc.clone())?;
            if json {
                return print_json(&day);
            }
            success(format!("Day {} started (day #{})", day.date_str(), day.id));
        }
        DayAction::End { day_id } => {
            let day = DayLogic::end_day(&mut pool, &caller, *day_id)?;
            if json {
                return print_json(&day);
            }
            success(format!("Day {} ended (day #{})", day.date_str(), day.id));
        }
        DayAction::Show { date } => {
            let date = validate_date(date)?;
            let found = match DayLogic::find_day_by_date(&pool, &caller, date)? {
                Some(day) => {
                    let blocks = DayLogic::list_blocks(&pool, &caller, day.id)?;
                    Some((day, blocks))
                }
                None => None,
            };

            if json {
                let value = found.map(|(day, blocks)| json!({ "day": day, "blocks": blocks }));
                return print_json(&value);
            }

            match found {
                Some((day, blocks)) => {
                    print_day(&day);
                    print_blocks(&blocks);
                }
                None => info(format!("No day recorded for {}", date)),
            }
        }
    }

    Ok(())
}
