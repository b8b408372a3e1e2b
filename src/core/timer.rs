use crate::core::validation::require_ordered;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{is_unique_violation, time_entries};
use crate::errors::{AppError, AppResult};
use crate::models::caller::Caller;
use crate::models::entry_mode::EntryMode;
use crate::models::time_entry::{EntryFields, TimeEntry};

/// Simple-mode timer: at most one open entry per user.
///
/// The check for an open entry and the insert run in one IMMEDIATE
/// transaction; the partial unique index on `time_entries` backs it up.
pub struct TimerLogic;

impl TimerLogic {
    pub fn start(pool: &mut DbPool, caller: &Caller, fields: EntryFields) -> AppResult<TimeEntry> {
        let tx = pool.write_tx()?;

        if let Some(active) = time_entries::find_active(&tx, &caller.user_id)? {
            return Err(AppError::ActiveTimerExists {
                entry_id: active.id,
                started_at: active.start_time,
            });
        }

        let mut entry = TimeEntry {
            id: 0,
            user_id: caller.user_id.clone(),
            start_time: caller.now,
            end_time: None,
            project_id: fields.project_id,
            category_id: fields.category_id,
            description: fields.description,
            entry_mode: EntryMode::Simple,
        };

        entry.id = match time_entries::insert(&tx, &entry) {
            Ok(id) => id,
            Err(AppError::Db(e)) if is_unique_violation(&e) => {
                // Lost a race against a writer that bypassed the transaction.
                let active = time_entries::find_active(&tx, &caller.user_id)?
                    .ok_or(AppError::Db(e))?;
                return Err(AppError::ActiveTimerExists {
                    entry_id: active.id,
                    started_at: active.start_time,
                });
            }
            Err(e) => return Err(e),
        };

        ttlog(
            &tx,
            "timer_start",
            &format!("entry #{}", entry.id),
            &format!("Timer started for {} at {}", caller.user_id, caller.now.to_rfc3339()),
        )?;
        tx.commit()?;

        Ok(entry)
    }

    pub fn stop(pool: &mut DbPool, caller: &Caller, fields: EntryFields) -> AppResult<TimeEntry> {
        let tx = pool.write_tx()?;

        let mut entry =
            time_entries::find_active(&tx, &caller.user_id)?.ok_or(AppError::NoActiveTimer)?;

        require_ordered(&entry.start_time, &caller.now)?;

        fields.merge_into(&mut entry);
        time_entries::close(&tx, &entry, caller.now)?;
        entry.end_time = Some(caller.now);

        let minutes = entry.duration(caller.now).num_minutes();
        ttlog(
            &tx,
            "timer_stop",
            &format!("entry #{}", entry.id),
            &format!("Timer stopped for {} after {} min", caller.user_id, minutes),
        )?;
        tx.commit()?;

        Ok(entry)
    }

    /// The user's running timer, if any. Absence is not an error.
    pub fn active(pool: &DbPool, caller: &Caller) -> AppResult<Option<TimeEntry>> {
        time_entries::find_active(&pool.conn, &caller.user_id)
    }

    /// The user's latest entries, newest first, running one included.
    pub fn recent(pool: &DbPool, caller: &Caller, limit: usize) -> AppResult<Vec<TimeEntry>> {
        time_entries::list_recent(&pool.conn, &caller.user_id, limit)
    }
}
