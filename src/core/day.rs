//! Day-mode: the per-date container and its blocks.

use crate::core::overlap::{Span, assert_no_conflict, find_conflict, overlap_error};
use crate::core::validation::{require_ordered, validate_instant, validate_instant_range};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{blocks, days, is_overlap_violation, is_unique_violation};
use crate::errors::{AppError, AppResult};
use crate::models::block::{Block, BlockDraft, BlockPatch, NewBlock};
use crate::models::caller::Caller;
use crate::models::day::Day;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

pub struct DayLogic;

/// Turn a trigger abort back into a BLOCK_OVERLAP naming the sibling.
pub(crate) fn storage_overlap<C>(
    conn: &Connection,
    candidate: &C,
    day_id: i64,
    exclude_id: Option<i64>,
    err: rusqlite::Error,
) -> AppError
where
    C: Span<Point = DateTime<Utc>>,
{
    if !is_overlap_violation(&err) {
        return AppError::Db(err);
    }
    match blocks::load_for_day(conn, day_id) {
        Ok(siblings) => match find_conflict(candidate, &siblings, exclude_id) {
            Some(block) => overlap_error(candidate, block),
            None => AppError::Db(err),
        },
        Err(e) => e,
    }
}

impl DayLogic {
    pub fn start_day(
        pool: &mut DbPool,
        caller: &Caller,
        date: NaiveDate,
        description: Option<String>,
    ) -> AppResult<Day> {
        let tx = pool.write_tx()?;

        if let Some(existing) = days::find_by_date(&tx, &caller.user_id, &date)? {
            return Err(AppError::DayAlreadyStarted {
                day_id: existing.id,
                date: existing.date_str(),
            });
        }

        let mut day = Day {
            id: 0,
            user_id: caller.user_id.clone(),
            date,
            start_time: caller.now,
            end_time: None,
            description,
        };

        day.id = match days::insert(&tx, &day) {
            Ok(id) => id,
            Err(AppError::Db(e)) if is_unique_violation(&e) => {
                let existing = days::find_by_date(&tx, &caller.user_id, &date)?
                    .ok_or(AppError::Db(e))?;
                return Err(AppError::DayAlreadyStarted {
                    day_id: existing.id,
                    date: existing.date_str(),
                });
            }
            Err(e) => return Err(e),
        };

        ttlog(
            &tx,
            "day_start",
            &format!("day #{}", day.id),
            &format!("Day {} started for {}", day.date_str(), caller.user_id),
        )?;
        tx.commit()?;

        Ok(day)
    }

    pub fn end_day(pool: &mut DbPool, caller: &Caller, day_id: i64) -> AppResult<Day> {
        let tx = pool.write_tx()?;

        let mut day =
            days::get_owned(&tx, &caller.user_id, day_id)?.ok_or(AppError::DayNotFound(day_id))?;

        if day.is_ended() {
            return Err(AppError::DayAlreadyEnded(day.id));
        }
        require_ordered(&day.start_time, &caller.now)?;

        days::set_end_time(&tx, day.id, caller.now)?;
        day.end_time = Some(caller.now);

        ttlog(
            &tx,
            "day_end",
            &format!("day #{}", day.id),
            &format!("Day {} ended", day.date_str()),
        )?;
        tx.commit()?;

        Ok(day)
    }

    pub fn get_day(pool: &DbPool, caller: &Caller, day_id: i64) -> AppResult<Day> {
        days::get_owned(&pool.conn, &caller.user_id, day_id)?.ok_or(AppError::DayNotFound(day_id))
    }

    pub fn find_day_by_date(pool: &DbPool, caller: &Caller, date: NaiveDate) -> AppResult<Option<Day>> {
        days::find_by_date(&pool.conn, &caller.user_id, &date)
    }

    /// Blocks of an owned day, ordered by start time.
    pub fn list_blocks(pool: &DbPool, caller: &Caller, day_id: i64) -> AppResult<Vec<Block>> {
        let day = Self::get_day(pool, caller, day_id)?;
        blocks::load_for_day(&pool.conn, day.id)
    }

    pub fn create_block(
        pool: &mut DbPool,
        caller: &Caller,
        day_id: i64,
        draft: BlockDraft,
    ) -> AppResult<Block> {
        let (start_time, end_time) = validate_instant_range(&draft.start_time, &draft.end_time)?;

        let tx = pool.write_tx()?;

        let day =
            days::get_owned(&tx, &caller.user_id, day_id)?.ok_or(AppError::DayNotFound(day_id))?;

        let candidate = NewBlock {
            day_id: day.id,
            start_time,
            end_time,
            project_id: draft.project_id,
            category_id: draft.category_id,
            description: draft.description,
        };

        let siblings = blocks::load_for_day(&tx, day.id)?;
        assert_no_conflict(&candidate, &siblings, None)?;

        let id = blocks::insert(&tx, &candidate)
            .map_err(|e| storage_overlap(&tx, &candidate, day.id, None, e))?;

        ttlog(
            &tx,
            "block_add",
            &format!("block #{}", id),
            &format!(
                "Block {} → {} added to day {}",
                start_time.format("%H:%M"),
                end_time.format("%H:%M"),
                day.date_str()
            ),
        )?;
        tx.commit()?;

        Ok(Block {
            id,
            day_id: candidate.day_id,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            project_id: candidate.project_id,
            category_id: candidate.category_id,
            description: candidate.description,
        })
    }

    /// Merge `patch` onto the block, re-check ordering and overlap against
    /// its siblings, then persist. Nothing changes if any check fails.
    pub fn update_block(
        pool: &mut DbPool,
        caller: &Caller,
        block_id: i64,
        patch: BlockPatch,
    ) -> AppResult<Block> {
        // Format errors surface before the database is touched.
        let new_start = patch.start_time.as_deref().map(validate_instant).transpose()?;
        let new_end = patch.end_time.as_deref().map(validate_instant).transpose()?;

        let tx = pool.write_tx()?;

        let mut block = blocks::get_owned(&tx, &caller.user_id, block_id)?
            .ok_or(AppError::BlockNotFound(block_id))?;

        if let Some(s) = new_start {
            block.start_time = s;
        }
        if let Some(e) = new_end {
            block.end_time = e;
        }
        if let Some(p) = patch.project_id {
            block.project_id = Some(p);
        }
        if let Some(c) = patch.category_id {
            block.category_id = Some(c);
        }
        if let Some(d) = patch.description {
            block.description = Some(d);
        }

        require_ordered(&block.start_time, &block.end_time)?;

        let siblings = blocks::load_for_day(&tx, block.day_id)?;
        assert_no_conflict(&block, &siblings, Some(block.id))?;

        blocks::update(&tx, &block)
            .map_err(|e| storage_overlap(&tx, &block, block.day_id, Some(block.id), e))?;

        ttlog(
            &tx,
            "block_edit",
            &format!("block #{}", block.id),
            &format!(
                "Block now {} → {}",
                block.start_time.format("%Y-%m-%d %H:%M"),
                block.end_time.format("%H:%M")
            ),
        )?;
        tx.commit()?;

        Ok(block)
    }

    pub fn delete_block(pool: &mut DbPool, caller: &Caller, block_id: i64) -> AppResult<()> {
        let tx = pool.write_tx()?;

        let block = blocks::get_owned(&tx, &caller.user_id, block_id)?
            .ok_or(AppError::BlockNotFound(block_id))?;

        blocks::delete(&tx, block.id)?;

        ttlog(
            &tx,
            "block_del",
            &format!("block #{}", block.id),
            &format!("Block removed from day #{}", block.day_id),
        )?;
        tx.commit()?;

        Ok(())
    }
}
