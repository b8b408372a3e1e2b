use crate::cli::commands::{caller, open_pool, print_json};
use crate::cli::parser::BlockAction;
use crate::config::Config;
use crate::core::day::DayLogic;
use crate::errors::AppResult;
use crate::models::block::{BlockDraft, BlockPatch};
use crate::ui::messages::{success, warning};
use crate::utils::formatting::fmt_span;

pub fn handle(action: &BlockAction, cfg: &Config, json: bool) -> AppResult<()> {
    let mut pool = open_pool(cfg)?;
    let caller = caller(cfg);

    match action {
        BlockAction::Add {
            day_id,
            start,
            end,
            fields,
        } => {
            let draft = BlockDraft {
                start_time: start.clone(),
                end_time: end.clone(),
                project_id: fields.project,
                category_id: fields.category,
                description: fields.desc.clone(),
            };
            let block = DayLogic::create_block(&mut pool, &caller, *day_id, draft)?;
            if json {
                return print_json(&block);
            }
            success(format!(
                "Block #{} added: {}",
                block.id,
                fmt_span(&block.start_time, &block.end_time)
            ));
        }
        BlockAction::Edit {
            block_id,
            start,
            end,
            fields,
        } => {
            let patch = BlockPatch {
                start_time: start.clone(),
                end_time: end.clone(),
                project_id: fields.project,
                category_id: fields.category,
                description: fields.desc.clone(),
            };
            if patch.is_empty() {
                warning("Nothing to change.");
                return Ok(());
            }
            let block = DayLogic::update_block(&mut pool, &caller, *block_id, patch)?;
            if json {
                return print_json(&block);
            }
            success(format!(
                "Block #{} updated: {}",
                block.id,
                fmt_span(&block.start_time, &block.end_time)
            ));
        }
        BlockAction::Del { block_id } => {
            DayLogic::delete_block(&mut pool, &caller, *block_id)?;
            success(format!("Block #{} deleted", block_id));
        }
    }

    Ok(())
}
