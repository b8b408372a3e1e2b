use rtimeblocks::core::day::DayLogic;
use rtimeblocks::core::template::{DEFAULT_APPLY_WINDOW_MONTHS, TemplateLogic};
use rtimeblocks::db::pool::DbPool;
use rtimeblocks::errors::{AppError, ErrorKind, OverlapSource};
use rtimeblocks::models::block::BlockDraft;
use rtimeblocks::models::caller::Caller;
use rtimeblocks::models::template::{Template, TemplateDraft, TemplateEntryDraft, TemplatePatch};
use std::sync::{Arc, Barrier};
use std::thread;

mod common;
use common::{caller_at, date, instant, memory_pool, setup_test_db};

const NOW: &str = "2026-02-01T08:00:00Z";

fn entry(start: &str, end: &str) -> TemplateEntryDraft {
    TemplateEntryDraft {
        start_time: start.into(),
        end_time: end.into(),
        ..TemplateEntryDraft::default()
    }
}

fn standard_day(pool: &mut DbPool, caller: &Caller) -> Template {
    TemplateLogic::create_template(
        pool,
        caller,
        TemplateDraft {
            name: "Standard day".into(),
            description: None,
            entries: vec![entry("13:00", "17:00"), entry("09:00", "12:00")],
        },
    )
    .unwrap()
}

fn count_rows(pool: &DbPool, table: &str) -> i64 {
    pool.conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn apply_creates_day_and_blocks() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let t = standard_day(&mut pool, &alice);

    let applied =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap();

    assert!(applied.day_created);
    assert_eq!(applied.day.date, date("2026-02-10"));

    let spans: Vec<_> = applied.blocks.iter().map(|b| (b.start_time, b.end_time)).collect();
    assert_eq!(
        spans,
        vec![
            (instant("2026-02-10T09:00:00Z"), instant("2026-02-10T12:00:00Z")),
            (instant("2026-02-10T13:00:00Z"), instant("2026-02-10T17:00:00Z")),
        ]
    );

    let stored = DayLogic::list_blocks(&pool, &alice, applied.day.id).unwrap();
    assert_eq!(stored, applied.blocks);
}

#[test]
fn reapplying_conflicts_and_adds_nothing() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let t = standard_day(&mut pool, &alice);

    let first =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap();

    let err =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.code(), "BLOCK_OVERLAP");

    assert_eq!(DayLogic::list_blocks(&pool, &alice, first.day.id).unwrap().len(), 2);
    assert_eq!(count_rows(&pool, "days"), 1);
}

#[test]
fn apply_reuses_an_existing_day_when_free() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let t = standard_day(&mut pool, &alice);

    let day = DayLogic::start_day(&mut pool, &alice, date("2026-02-10"), None).unwrap();
    DayLogic::create_block(
        &mut pool,
        &alice,
        day.id,
        BlockDraft {
            start_time: "2026-02-10T12:00:00Z".into(),
            end_time: "2026-02-10T13:00:00Z".into(),
            ..BlockDraft::default()
        },
    )
    .unwrap();

    let applied =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap();
    assert!(!applied.day_created);
    assert_eq!(applied.day.id, day.id);
    assert_eq!(DayLogic::list_blocks(&pool, &alice, day.id).unwrap().len(), 3);
}

#[test]
fn partial_conflict_leaves_no_trace() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let t = standard_day(&mut pool, &alice);

    let day = DayLogic::start_day(&mut pool, &alice, date("2026-02-10"), None).unwrap();
    let existing = DayLogic::create_block(
        &mut pool,
        &alice,
        day.id,
        BlockDraft {
            start_time: "2026-02-10T16:00:00Z".into(),
            end_time: "2026-02-10T18:00:00Z".into(),
            ..BlockDraft::default()
        },
    )
    .unwrap();

    let err =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap_err();
    match err {
        AppError::BlockOverlap {
            collides_with: OverlapSource::Existing(c),
            start_time,
            ..
        } => {
            assert_eq!(c.block_id, existing.id);
            assert_eq!(start_time, instant("2026-02-10T13:00:00Z"));
        }
        other => panic!("expected BLOCK_OVERLAP, got {other:?}"),
    }

    // 09:00-12:00 did not conflict but must not have been written either.
    assert_eq!(DayLogic::list_blocks(&pool, &alice, day.id).unwrap(), vec![existing]);
}

#[test]
fn failed_apply_on_new_date_creates_no_day() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);

    let t = TemplateLogic::create_template(
        &mut pool,
        &alice,
        TemplateDraft {
            name: "Clashing".into(),
            description: None,
            entries: vec![entry("09:00", "11:00"), entry("10:30", "12:00")],
        },
    )
    .unwrap();

    let err =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-02-11", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap_err();
    match err {
        AppError::BlockOverlap {
            collides_with: OverlapSource::Template(c),
            ..
        } => {
            assert_eq!(c.first.0.to_string(), "09:00");
            assert_eq!(c.second.0.to_string(), "10:30");
        }
        other => panic!("expected template collision, got {other:?}"),
    }

    assert!(DayLogic::find_day_by_date(&pool, &alice, date("2026-02-11")).unwrap().is_none());
    assert_eq!(count_rows(&pool, "blocks"), 0);
}

#[test]
fn date_outside_window_fails_before_storage() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);

    // Template 999 does not exist: a NOT_FOUND would mean storage was read.
    let far = (alice.today() + chrono::Duration::days(400)).format("%Y-%m-%d").to_string();
    let err = TemplateLogic::apply_template(&mut pool, &alice, 999, &far, DEFAULT_APPLY_WINDOW_MONTHS)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(err.code(), "DATE_OUT_OF_RANGE");

    let past = (alice.today() - chrono::Duration::days(400)).format("%Y-%m-%d").to_string();
    let err = TemplateLogic::apply_template(&mut pool, &alice, 999, &past, DEFAULT_APPLY_WINDOW_MONTHS)
        .unwrap_err();
    assert_eq!(err.code(), "DATE_OUT_OF_RANGE");

    for malformed in ["10/02/2026", "2026-02-30"] {
        let err = TemplateLogic::apply_template(&mut pool, &alice, 999, malformed, DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.code(), "DATE_OUT_OF_RANGE", "{malformed}");
    }

    let err = TemplateLogic::apply_template(&mut pool, &alice, 999, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
        .unwrap_err();
    assert_eq!(err.code(), "TEMPLATE_NOT_FOUND");
}

#[test]
fn window_spans_a_calendar_year_across_leap_day() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", "2027-03-01T08:00:00Z");
    let t = standard_day(&mut pool, &alice);

    // 366 days ahead, because 2028-02-29 lies in between.
    let applied =
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2028-03-01", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap();
    assert_eq!(applied.day.date, date("2028-03-01"));

    let err = TemplateLogic::apply_template(&mut pool, &alice, t.id, "2028-03-02", DEFAULT_APPLY_WINDOW_MONTHS)
        .unwrap_err();
    assert_eq!(err.code(), "DATE_OUT_OF_RANGE");

    assert!(
        TemplateLogic::apply_template(&mut pool, &alice, t.id, "2026-03-01", DEFAULT_APPLY_WINDOW_MONTHS)
            .is_ok()
    );
}

#[test]
fn create_validates_each_entry() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);

    let bad_time = TemplateDraft {
        name: "Bad".into(),
        description: None,
        entries: vec![entry("09:00", "24:00")],
    };
    assert_eq!(
        TemplateLogic::create_template(&mut pool, &alice, bad_time).unwrap_err().code(),
        "INVALID_TIME"
    );

    let reversed = TemplateDraft {
        name: "Bad".into(),
        description: None,
        entries: vec![entry("12:00", "09:00")],
    };
    assert_eq!(
        TemplateLogic::create_template(&mut pool, &alice, reversed).unwrap_err().code(),
        "INVALID_RANGE"
    );

    let blank = TemplateDraft {
        name: "   ".into(),
        description: None,
        entries: vec![],
    };
    assert_eq!(
        TemplateLogic::create_template(&mut pool, &alice, blank).unwrap_err().code(),
        "INVALID_NAME"
    );

    assert!(TemplateLogic::list_templates(&pool, &alice).unwrap().is_empty());
}

#[test]
fn from_day_copies_block_times() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let source = standard_day(&mut pool, &alice);
    let applied =
        TemplateLogic::apply_template(&mut pool, &alice, source.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap();

    let copy =
        TemplateLogic::create_from_day(&mut pool, &alice, applied.day.id, "Copy", Some("from day".into()))
            .unwrap();

    let times: Vec<(String, String)> = copy
        .entries
        .iter()
        .map(|e| (e.start_time.to_string(), e.end_time.to_string()))
        .collect();
    assert_eq!(
        times,
        vec![
            ("09:00".to_string(), "12:00".to_string()),
            ("13:00".to_string(), "17:00".to_string()),
        ]
    );
    assert_eq!(TemplateLogic::get_template(&pool, &alice, copy.id).unwrap(), copy);
}

#[test]
fn from_day_rejects_blocks_crossing_midnight() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let day = DayLogic::start_day(&mut pool, &alice, date("2026-02-10"), None).unwrap();
    DayLogic::create_block(
        &mut pool,
        &alice,
        day.id,
        BlockDraft {
            start_time: "2026-02-10T22:00:00Z".into(),
            end_time: "2026-02-11T01:00:00Z".into(),
            ..BlockDraft::default()
        },
    )
    .unwrap();

    let err = TemplateLogic::create_from_day(&mut pool, &alice, day.id, "Night", None).unwrap_err();
    assert_eq!(err.code(), "INVALID_RANGE");
    assert_eq!(count_rows(&pool, "templates"), 0);

    let err = TemplateLogic::create_from_day(&mut pool, &alice, 4242, "Nothing", None).unwrap_err();
    assert_eq!(err.code(), "DAY_NOT_FOUND");
}

#[test]
fn from_day_rounds_sub_minute_blocks_up() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let day = DayLogic::start_day(&mut pool, &alice, date("2026-02-10"), None).unwrap();
    for (start, end) in [
        ("2026-02-10T09:00:10Z", "2026-02-10T09:00:50Z"),
        ("2026-02-10T10:15:00Z", "2026-02-10T10:45:30Z"),
    ] {
        DayLogic::create_block(
            &mut pool,
            &alice,
            day.id,
            BlockDraft {
                start_time: start.into(),
                end_time: end.into(),
                ..BlockDraft::default()
            },
        )
        .unwrap();
    }

    let copy = TemplateLogic::create_from_day(&mut pool, &alice, day.id, "Short", None).unwrap();
    let times: Vec<String> = copy
        .entries
        .iter()
        .map(|e| format!("{}-{}", e.start_time, e.end_time))
        .collect();
    assert_eq!(times, vec!["09:00-09:01", "10:15-10:46"]);
}

#[test]
fn from_day_rejects_blocks_ending_in_the_last_minute() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let day = DayLogic::start_day(&mut pool, &alice, date("2026-02-10"), None).unwrap();
    DayLogic::create_block(
        &mut pool,
        &alice,
        day.id,
        BlockDraft {
            start_time: "2026-02-10T23:00:00Z".into(),
            end_time: "2026-02-10T23:59:30Z".into(),
            ..BlockDraft::default()
        },
    )
    .unwrap();

    let err = TemplateLogic::create_from_day(&mut pool, &alice, day.id, "Late", None).unwrap_err();
    assert_eq!(err.code(), "INVALID_RANGE");
    assert_eq!(count_rows(&pool, "templates"), 0);
}

#[test]
fn concurrent_applies_to_one_date_commit_exactly_once() {
    let db_path = setup_test_db("concurrent_template_apply");
    let template_id = {
        let mut pool = DbPool::new(&db_path).unwrap();
        standard_day(&mut pool, &caller_at("alice", NOW)).id
    };

    const WORKERS: usize = 8;
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let path = db_path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut pool = DbPool::new(&path).unwrap();
                let alice = caller_at("alice", NOW);
                barrier.wait();
                TemplateLogic::apply_template(
                    &mut pool,
                    &alice,
                    template_id,
                    "2026-02-10",
                    DEFAULT_APPLY_WINDOW_MONTHS,
                )
                .map(|applied| applied.day_created)
                .map_err(|e| e.code())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "{results:?}");
    assert!(results.iter().any(|r| *r == Ok(true)));
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|code| *code == "BLOCK_OVERLAP"),
        "{results:?}"
    );

    let pool = DbPool::new(&db_path).unwrap();
    assert_eq!(count_rows(&pool, "days"), 1);
    assert_eq!(count_rows(&pool, "blocks"), 2);
}

#[test]
fn update_replaces_entries_wholesale() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let t = standard_day(&mut pool, &alice);

    let renamed = TemplateLogic::update_template(
        &mut pool,
        &alice,
        t.id,
        TemplatePatch {
            name: Some("Short day".into()),
            ..TemplatePatch::default()
        },
    )
    .unwrap();
    assert_eq!(renamed.name, "Short day");
    assert_eq!(renamed.entries.len(), 2);

    let replaced = TemplateLogic::update_template(
        &mut pool,
        &alice,
        t.id,
        TemplatePatch {
            entries: Some(vec![entry("08:00", "12:00")]),
            ..TemplatePatch::default()
        },
    )
    .unwrap();
    assert_eq!(replaced.entries.len(), 1);

    let stored = TemplateLogic::get_template(&pool, &alice, t.id).unwrap();
    assert_eq!(stored.name, "Short day");
    assert_eq!(stored.entries, replaced.entries);

    // An invalid replacement keeps the previous entries.
    let err = TemplateLogic::update_template(
        &mut pool,
        &alice,
        t.id,
        TemplatePatch {
            entries: Some(vec![entry("08:00", "09:00"), entry("10:00", "07:00")]),
            ..TemplatePatch::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_RANGE");
    assert_eq!(TemplateLogic::get_template(&pool, &alice, t.id).unwrap().entries.len(), 1);
}

#[test]
fn templates_are_private_to_their_owner() {
    let mut pool = memory_pool();
    let alice = caller_at("alice", NOW);
    let bob = caller_at("bob", NOW);
    let t = standard_day(&mut pool, &alice);

    assert_eq!(
        TemplateLogic::get_template(&pool, &bob, t.id).unwrap_err().code(),
        "TEMPLATE_NOT_FOUND"
    );
    assert_eq!(
        TemplateLogic::apply_template(&mut pool, &bob, t.id, "2026-02-10", DEFAULT_APPLY_WINDOW_MONTHS)
            .unwrap_err()
            .code(),
        "TEMPLATE_NOT_FOUND"
    );
    assert!(TemplateLogic::delete_template(&mut pool, &bob, t.id).is_err());
    assert!(TemplateLogic::list_templates(&pool, &bob).unwrap().is_empty());

    TemplateLogic::delete_template(&mut pool, &alice, t.id).unwrap();
    assert!(TemplateLogic::list_templates(&pool, &alice).unwrap().is_empty());
    assert_eq!(count_rows(&pool, "template_entries"), 0);
}
