use chrono::Utc;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{init_cli_db, rtb, setup_test_db};

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[test]
fn init_applies_migrations() {
    let db_path = setup_test_db("cli_init");

    rtb()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"))
        .stdout(contains("3 migrations applied"));

    rtb()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("init"));
}

#[test]
fn timer_start_status_stop() {
    let db_path = setup_test_db("cli_timer");
    init_cli_db(&db_path);

    rtb()
        .args(["--db", &db_path, "--user", "alice", "timer", "start", "--desc", "review"])
        .assert()
        .success()
        .stdout(contains("Timer started"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "timer", "start"])
        .assert()
        .failure()
        .stderr(contains("CONFLICT/ACTIVE_TIMER_EXISTS"));

    rtb()
        .args(["--db", &db_path, "--user", "bob", "timer", "status"])
        .assert()
        .success()
        .stdout(contains("No timer running"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "timer", "status"])
        .assert()
        .success()
        .stdout(contains("Timer running").and(contains("review")));
}

#[test]
fn stop_without_timer_fails() {
    let db_path = setup_test_db("cli_timer_stop_none");
    init_cli_db(&db_path);

    rtb()
        .args(["--db", &db_path, "--user", "alice", "timer", "stop"])
        .assert()
        .failure()
        .stderr(contains("NOT_FOUND/NO_ACTIVE_TIMER"));
}

#[test]
fn day_and_blocks() {
    let db_path = setup_test_db("cli_day_blocks");
    init_cli_db(&db_path);
    let d = today();

    rtb()
        .args(["--db", &db_path, "--user", "alice", "day", "start", &d])
        .assert()
        .success()
        .stdout(contains("(day #1)"));

    rtb()
        .args([
            "--db",
            &db_path,
            "--user",
            "alice",
            "block",
            "add",
            "1",
            &format!("{d}T09:00:00Z"),
            &format!("{d}T10:00:00Z"),
            "--desc",
            "standup",
        ])
        .assert()
        .success()
        .stdout(contains("09:00 → 10:00"));

    rtb()
        .args([
            "--db",
            &db_path,
            "--user",
            "alice",
            "block",
            "add",
            "1",
            &format!("{d}T09:30:00Z"),
            &format!("{d}T11:00:00Z"),
        ])
        .assert()
        .failure()
        .stderr(contains("CONFLICT/BLOCK_OVERLAP"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "day", "show", &d])
        .assert()
        .success()
        .stdout(contains("standup"))
        .stdout(contains("01h 00m"));

    rtb()
        .args(["--db", &db_path, "--user", "bob", "block", "del", "1"])
        .assert()
        .failure()
        .stderr(contains("BLOCK_NOT_FOUND"));
}

#[test]
fn template_create_and_apply() {
    let db_path = setup_test_db("cli_templates");
    init_cli_db(&db_path);
    let d = today();

    rtb()
        .args([
            "--db",
            &db_path,
            "--user",
            "alice",
            "template",
            "create",
            "Standard",
            "--entry",
            "09:00-12:00=Focus",
            "--entry",
            "13:00-17:00",
        ])
        .assert()
        .success()
        .stdout(contains("with 2 entries"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "--json", "template", "show", "1"])
        .assert()
        .success()
        .stdout(contains(r#""start_time": "09:00""#))
        .stdout(contains(r#""description": "Focus""#));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "template", "list"])
        .assert()
        .success()
        .stdout(contains("Standard"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "template", "apply", "1", &d])
        .assert()
        .success()
        .stdout(contains("2 blocks").and(contains("created")));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "template", "apply", "1", &d])
        .assert()
        .failure()
        .stderr(contains("BLOCK_OVERLAP"));

    rtb()
        .args(["--db", &db_path, "--user", "alice", "template", "apply", "1", "2999-01-01"])
        .assert()
        .failure()
        .stderr(contains("VALIDATION_ERROR/DATE_OUT_OF_RANGE"));
}

#[test]
fn template_entry_must_be_valid() {
    let db_path = setup_test_db("cli_template_bad_entry");
    init_cli_db(&db_path);

    rtb()
        .args([
            "--db", &db_path, "--user", "alice", "template", "create", "Bad", "--entry", "9-12",
        ])
        .assert()
        .failure()
        .stderr(contains("INVALID_TIME"));
}

#[test]
fn config_print_shows_overrides() {
    let db_path = setup_test_db("cli_config");

    rtb()
        .args(["--db", &db_path, "--user", "carol", "config", "--print"])
        .assert()
        .success()
        .stdout(contains("default_user: carol"))
        .stdout(contains("template_window_months"));
}
