//! Templates: reusable time-of-day patterns and their expansion onto a date.

use crate::core::day::storage_overlap;
use crate::core::overlap::{assert_no_conflict, find_internal_conflict};
use crate::core::validation::{
    require_name, require_ordered, validate_apply_date, validate_time_of_day_range,
};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{blocks, days, templates};
use crate::errors::{AppError, AppResult, EntryCollision, OverlapSource};
use crate::models::block::{Block, NewBlock};
use crate::models::caller::Caller;
use crate::models::day::Day;
use crate::models::template::{
    Template, TemplateDraft, TemplateEntry, TemplateEntryDraft, TemplatePatch,
};
use crate::models::time_of_day::TimeOfDay;
use serde::Serialize;

pub const DEFAULT_APPLY_WINDOW_MONTHS: u32 = 12;

/// Outcome of a successful template application.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedTemplate {
    pub day: Day,
    pub day_created: bool,
    pub blocks: Vec<Block>,
}

pub struct TemplateLogic;

/// Validate each entry on its own: format and ordering. Entries are not
/// checked against each other here; that happens when the template is applied.
fn validate_entries(drafts: Vec<TemplateEntryDraft>) -> AppResult<Vec<TemplateEntry>> {
    drafts
        .into_iter()
        .map(|d| {
            let (start_time, end_time) = validate_time_of_day_range(&d.start_time, &d.end_time)?;
            Ok(TemplateEntry {
                start_time,
                end_time,
                project_id: d.project_id,
                category_id: d.category_id,
                description: d.description,
            })
        })
        .collect()
}

/// Project a block onto the time-of-day axis. The start floors and the end
/// rounds up to the minute, so a block shorter than a minute still yields a
/// one-minute entry. Blocks that cross midnight or end during 23:59 have no
/// time-of-day form.
fn entry_from_block(block: &Block) -> AppResult<TemplateEntry> {
    let crossing = || AppError::InvalidRange {
        start: block.start_time.to_rfc3339(),
        end: block.end_time.to_rfc3339(),
    };

    if block.start_time.date_naive() != block.end_time.date_naive() {
        return Err(crossing());
    }
    let start = TimeOfDay::from_instant(&block.start_time);
    let end = TimeOfDay::ceil_instant(&block.end_time).ok_or_else(crossing)?;
    require_ordered(&start, &end)?;

    Ok(TemplateEntry {
        start_time: start,
        end_time: end,
        project_id: block.project_id,
        category_id: block.category_id,
        description: block.description.clone(),
    })
}

impl TemplateLogic {
    pub fn create_template(pool: &mut DbPool, caller: &Caller, draft: TemplateDraft) -> AppResult<Template> {
        let name = require_name(&draft.name)?;
        let entries = validate_entries(draft.entries)?;

        let mut template = Template {
            id: 0,
            user_id: caller.user_id.clone(),
            name,
            description: draft.description,
            entries,
            created_at: caller.now,
        };

        let tx = pool.write_tx()?;
        template.id = templates::insert(&tx, &template)?;
        ttlog(
            &tx,
            "template_create",
            &format!("template #{}", template.id),
            &format!("Template '{}' with {} entries", template.name, template.entries.len()),
        )?;
        tx.commit()?;

        Ok(template)
    }

    /// New template whose entries mirror the current blocks of a day.
    pub fn create_from_day(
        pool: &mut DbPool,
        caller: &Caller,
        day_id: i64,
        name: &str,
        description: Option<String>,
    ) -> AppResult<Template> {
        let name = require_name(name)?;

        let tx = pool.write_tx()?;

        let day =
            days::get_owned(&tx, &caller.user_id, day_id)?.ok_or(AppError::DayNotFound(day_id))?;

        let entries = blocks::load_for_day(&tx, day.id)?
            .iter()
            .map(entry_from_block)
            .collect::<AppResult<Vec<_>>>()?;

        let mut template = Template {
            id: 0,
            user_id: caller.user_id.clone(),
            name,
            description,
            entries,
            created_at: caller.now,
        };

        template.id = templates::insert(&tx, &template)?;
        ttlog(
            &tx,
            "template_create",
            &format!("template #{}", template.id),
            &format!(
                "Template '{}' derived from day {} ({} entries)",
                template.name,
                day.date_str(),
                template.entries.len()
            ),
        )?;
        tx.commit()?;

        Ok(template)
    }

    pub fn update_template(
        pool: &mut DbPool,
        caller: &Caller,
        template_id: i64,
        patch: TemplatePatch,
    ) -> AppResult<Template> {
        let name = patch.name.as_deref().map(require_name).transpose()?;
        let entries = patch.entries.map(validate_entries).transpose()?;

        let tx = pool.write_tx()?;

        let mut template = templates::get_owned(&tx, &caller.user_id, template_id)?
            .ok_or(AppError::TemplateNotFound(template_id))?;

        if let Some(n) = name {
            template.name = n;
        }
        if let Some(d) = patch.description {
            template.description = Some(d);
        }
        templates::update_header(&tx, &template)?;

        if let Some(new_entries) = entries {
            templates::replace_entries(&tx, template.id, &new_entries)?;
            template.entries = new_entries;
        }

        ttlog(
            &tx,
            "template_update",
            &format!("template #{}", template.id),
            &format!("Template '{}' updated", template.name),
        )?;
        tx.commit()?;

        Ok(template)
    }

    pub fn get_template(pool: &DbPool, caller: &Caller, template_id: i64) -> AppResult<Template> {
        templates::get_owned(&pool.conn, &caller.user_id, template_id)?
            .ok_or(AppError::TemplateNotFound(template_id))
    }

    pub fn list_templates(pool: &DbPool, caller: &Caller) -> AppResult<Vec<Template>> {
        templates::list_for_user(&pool.conn, &caller.user_id)
    }

    pub fn delete_template(pool: &mut DbPool, caller: &Caller, template_id: i64) -> AppResult<()> {
        let tx = pool.write_tx()?;

        let template = templates::get_owned(&tx, &caller.user_id, template_id)?
            .ok_or(AppError::TemplateNotFound(template_id))?;
        templates::delete(&tx, template.id)?;

        ttlog(
            &tx,
            "template_del",
            &format!("template #{}", template.id),
            &format!("Template '{}' deleted", template.name),
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Expand a template onto `date` as new blocks, all or nothing.
    ///
    /// Phase 1 validates every derived block against the day's stored blocks
    /// and against each other; phase 2 writes the day (if new) and all blocks.
    /// Both phases share one IMMEDIATE transaction, so a failure anywhere
    /// leaves no trace.
    pub fn apply_template(
        pool: &mut DbPool,
        caller: &Caller,
        template_id: i64,
        date: &str,
        window_months: u32,
    ) -> AppResult<AppliedTemplate> {
        let date = validate_apply_date(date, caller.today(), window_months)?;

        let tx = pool.write_tx()?;

        let template = templates::get_owned(&tx, &caller.user_id, template_id)?
            .ok_or(AppError::TemplateNotFound(template_id))?;

        let mut entries = template.entries;
        entries.sort_by_key(|e| (e.start_time, e.end_time));

        let existing_day = days::find_by_date(&tx, &caller.user_id, &date)?;
        let existing_blocks = match &existing_day {
            Some(day) => blocks::load_for_day(&tx, day.id)?,
            None => Vec::new(),
        };

        let mut candidates: Vec<NewBlock> = entries
            .iter()
            .map(|e| NewBlock {
                day_id: existing_day.as_ref().map_or(0, |d| d.id),
                start_time: e.start_time.on(date),
                end_time: e.end_time.on(date),
                project_id: e.project_id,
                category_id: e.category_id,
                description: e.description.clone(),
            })
            .collect();

        // Phase 1: validate everything before the first write.
        for candidate in &candidates {
            assert_no_conflict(candidate, &existing_blocks, None)?;
        }
        if let Some((i, j)) = find_internal_conflict(&entries) {
            return Err(AppError::BlockOverlap {
                start_time: candidates[j].start_time,
                end_time: candidates[j].end_time,
                collides_with: OverlapSource::Template(EntryCollision {
                    first: (entries[i].start_time, entries[i].end_time),
                    second: (entries[j].start_time, entries[j].end_time),
                }),
            });
        }

        // Phase 2: commit the day and every block as one unit.
        let (day, day_created) = match existing_day {
            Some(day) => (day, false),
            None => {
                let mut day = Day {
                    id: 0,
                    user_id: caller.user_id.clone(),
                    date,
                    start_time: caller.now,
                    end_time: None,
                    description: None,
                };
                day.id = days::insert(&tx, &day)?;
                (day, true)
            }
        };

        for candidate in candidates.iter_mut() {
            candidate.day_id = day.id;
        }

        let mut created = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let id = blocks::insert(&tx, candidate)
                .map_err(|e| storage_overlap(&tx, candidate, day.id, None, e))?;
            created.push(Block {
                id,
                day_id: day.id,
                start_time: candidate.start_time,
                end_time: candidate.end_time,
                project_id: candidate.project_id,
                category_id: candidate.category_id,
                description: candidate.description.clone(),
            });
        }

        ttlog(
            &tx,
            "template_apply",
            &format!("template #{}", template.id),
            &format!(
                "Template '{}' applied to {}: {} blocks{}",
                template.name,
                day.date_str(),
                created.len(),
                if day_created { " (day created)" } else { "" }
            ),
        )?;
        tx.commit()?;

        Ok(AppliedTemplate {
            day,
            day_created,
            blocks: created,
        })
    }
}
