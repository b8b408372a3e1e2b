use crate::cli::commands::day::print_blocks;
use crate::cli::commands::{caller, open_pool, print_json};
use crate::cli::parser::TemplateAction;
use crate::config::Config;
use crate::core::template::TemplateLogic;
use crate::errors::{AppError, AppResult};
use crate::models::template::{Template, TemplateDraft, TemplateEntryDraft, TemplatePatch};
use crate::ui::messages::{header, info, success};
use crate::utils::formatting::opt_or_dash;
use crate::utils::table::Table;

/// Parse `HH:MM-HH:MM[=description]`. The times themselves are validated
/// by the template engine.
pub(crate) fn parse_entry(raw: &str) -> AppResult<TemplateEntryDraft> {
    let (span, description) = match raw.split_once('=') {
        Some((s, d)) if !d.trim().is_empty() => (s, Some(d.trim().to_string())),
        Some((s, _)) => (s, None),
        None => (raw, None),
    };

    let (start, end) = span
        .split_once('-')
        .ok_or_else(|| AppError::InvalidTime(raw.to_string()))?;

    Ok(TemplateEntryDraft {
        start_time: start.trim().to_string(),
        end_time: end.trim().to_string(),
        project_id: None,
        category_id: None,
        description,
    })
}

fn parse_entries(raw: &[String]) -> AppResult<Vec<TemplateEntryDraft>> {
    raw.iter().map(|r| parse_entry(r)).collect()
}

fn print_template(t: &Template) {
    header(format!("Template #{}: {}", t.id, t.name));
    if let Some(d) = &t.description {
        println!("{}\n", d);
    }
    if t.entries.is_empty() {
        info("No entries");
        return;
    }

    let mut table = Table::new(["#", "FROM", "TO", "PROJECT", "CATEGORY", "NOTE"]);
    for (i, e) in t.entries.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            e.start_time.to_string(),
            e.end_time.to_string(),
            opt_or_dash(e.project_id),
            opt_or_dash(e.category_id),
            opt_or_dash(e.description.as_deref()),
        ]);
    }
    print!("{}", table.render());
}

pub fn handle(action: &TemplateAction, cfg: &Config, json: bool) -> AppResult<()> {
    let mut pool = open_pool(cfg)?;
    let caller = caller(cfg);

    match action {
        TemplateAction::Create {
            name,
            entries,
            desc,
        } => {
            let draft = TemplateDraft {
                name: name.clone(),
                description: desc.clone(),
                entries: parse_entries(entries)?,
            };
            let t = TemplateLogic::create_template(&mut pool, &caller, draft)?;
            if json {
                return print_json(&t);
            }
            success(format!(
                "Template #{} '{}' created with {} entries",
                t.id,
                t.name,
                t.entries.len()
            ));
        }
        TemplateAction::FromDay { day_id, name, desc } => {
            let t = TemplateLogic::create_from_day(&mut pool, &caller, *day_id, name, desc.clone())?;
            if json {
                return print_json(&t);
            }
            success(format!(
                "Template #{} '{}' created from day #{} ({} entries)",
                t.id,
                t.name,
                day_id,
                t.entries.len()
            ));
        }
        TemplateAction::Update {
            id,
            name,
            desc,
            entries,
            clear_entries,
        } => {
            let entries = if *clear_entries {
                Some(Vec::new())
            } else if entries.is_empty() {
                None
            } else {
                Some(parse_entries(entries)?)
            };
            let patch = TemplatePatch {
                name: name.clone(),
                description: desc.clone(),
                entries,
            };
            let t = TemplateLogic::update_template(&mut pool, &caller, *id, patch)?;
            if json {
                return print_json(&t);
            }
            success(format!("Template #{} '{}' updated", t.id, t.name));
        }
        TemplateAction::List => {
            let templates = TemplateLogic::list_templates(&pool, &caller)?;
            if json {
                return print_json(&templates);
            }
            if templates.is_empty() {
                info("No templates");
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME", "ENTRIES", "DESCRIPTION"]);
            for t in &templates {
                table.add_row(vec![
                    t.id.to_string(),
                    t.name.clone(),
                    t.entries.len().to_string(),
                    opt_or_dash(t.description.as_deref()),
                ]);
            }
            print!("{}", table.render());
        }
        TemplateAction::Show { id } => {
            let t = TemplateLogic::get_template(&pool, &caller, *id)?;
            if json {
                return print_json(&t);
            }
            print_template(&t);
        }
        TemplateAction::Del { id } => {
            TemplateLogic::delete_template(&mut pool, &caller, *id)?;
            success(format!("Template #{} deleted", id));
        }
        TemplateAction::Apply { id, date } => {
            let applied =
                TemplateLogic::apply_template(&mut pool, &caller, *id, date, cfg.template_window_months)?;
            if json {
                return print_json(&applied);
            }
            success(format!(
                "Template #{} applied to {}: {} blocks{}",
                id,
                applied.day.date_str(),
                applied.blocks.len(),
                if applied.day_created {
                    format!(" (day #{} created)", applied.day.id)
                } else {
                    String::new()
                }
            ));
            print_blocks(&applied.blocks);
        }
    }

    Ok(())
}
