use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use unicode_width::UnicodeWidthStr;

const MAX_OP_WIDTH: usize = 40;

/// Colour for an audit operation, keyed on its family prefix.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        o if o.ends_with("_start") || o.ends_with("_add") || o.ends_with("_create") => {
            Colour::Green
        }
        o if o.ends_with("_stop") || o.ends_with("_end") || o.ends_with("_del") => Colour::Red,
        o if o.ends_with("_edit") || o.ends_with("_update") => Colour::Yellow,
        o if o.ends_with("_apply") => Colour::Cyan,
        _ => Colour::White,
    }
}

/// `operation (target)`, cut to `MAX_OP_WIDTH` visible columns.
fn op_target(row: &LogRow) -> String {
    let full = if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    };

    if full.width() <= MAX_OP_WIDTH {
        return full;
    }
    let mut cut: String = full.chars().take(MAX_OP_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let rows = load_log(&pool.conn)?;

        if rows.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.date.width()).max().unwrap_or(10);
        let labels: Vec<String> = rows.iter().map(op_target).collect();
        let op_w = labels.iter().map(|l| l.width()).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for (row, label) in rows.iter().zip(labels) {
            let color = color_for_operation(&row.operation);
            let padding = " ".repeat(op_w.saturating_sub(label.width()));

            // Only the operation word is coloured; the target stays plain.
            let painted = match label.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(label.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id, row.date, painted, padding, row.message
            );
        }

        Ok(())
    }
}
