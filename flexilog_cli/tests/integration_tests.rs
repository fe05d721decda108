//! Integration tests for the flexilog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Guided session logging (scripted and interactive)
//! - Weekly plan and exercise library edits
//! - History listing, clearing and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("flexilog"))
}

fn run(data_dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    cli().args(args).arg("--data-dir").arg(data_dir).assert()
}

fn read_history(data_dir: &Path) -> Vec<Value> {
    let content = fs::read_to_string(data_dir.join("history.jsonl")).expect("read history");
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect()
}

fn set_field(log: &Value, field: &str) -> Vec<Value> {
    log["sets"]
        .as_array()
        .expect("sets array")
        .iter()
        .map(|s| s[field].clone())
        .collect()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly workout planner"));
}

#[test]
fn test_auto_complete_logs_every_set() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "monday", "--auto-complete"])
        .success()
        .stdout(predicate::str::contains("Workout logged"));

    let logs = read_history(data_dir);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["day_id"], "Monday");
    assert_eq!(logs[0]["sets"].as_array().unwrap().len(), 18);

    let numbers = set_field(&logs[0], "set_number");
    assert_eq!(numbers[..6], [1, 2, 3, 4, 5, 1].map(Value::from));
}

#[test]
fn test_start_on_empty_day_fails() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["start", "saturday", "--auto-complete"])
        .failure()
        .stderr(predicate::str::contains("no planned sets"));

    assert!(!temp_dir.path().join("history.jsonl").exists());
}

#[test]
fn test_start_on_unknown_day_fails() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["start", "someday"])
        .failure()
        .stderr(predicate::str::contains("unknown day"));
}

#[test]
fn test_interactive_session_records_typed_values() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["plan", "add", "sunday", "hs-prep", "--sets", "1"]).success();
    run(data_dir, &["plan", "add", "sunday", "back-extension"]).success();

    // hs-prep has no rest; the blank line skips the rest after back-extension
    cli()
        .args(["start", "sunday", "--data-dir"])
        .arg(data_dir)
        .write_stdin("45s\n12 reps\n\n10.5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged! 3 sets recorded."));

    let logs = read_history(data_dir);
    assert_eq!(logs.len(), 1);
    assert_eq!(set_field(&logs[0], "value"), [45, 12, 10].map(Value::from));
    assert_eq!(set_field(&logs[0], "set_number"), [1, 1, 2].map(Value::from));
    assert_eq!(
        set_field(&logs[0], "type"),
        ["TIME", "REPS", "REPS"].map(Value::from)
    );
}

#[test]
fn test_quit_cancels_without_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["start", "wednesday", "--data-dir"])
        .arg(data_dir)
        .write_stdin("8\n\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout cancelled"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_closed_input_cancels_without_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["start", "wednesday", "--data-dir"])
        .arg(data_dir)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Input closed"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_removed_exercise_steps_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["exercises", "remove", "dips"])
        .success()
        .stdout(predicate::str::contains("will be skipped"));

    run(data_dir, &["start", "monday", "--auto-complete"]).success();

    let logs = read_history(data_dir);
    assert_eq!(logs[0]["sets"].as_array().unwrap().len(), 14);
    assert!(!set_field(&logs[0], "exercise_id").contains(&Value::from("dips")));
}

#[test]
fn test_plan_editing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["plan", "clear", "monday"]).success();
    run(data_dir, &["plan", "add", "monday", "dips", "--sets", "2"]).success();
    run(data_dir, &["plan", "add", "monday", "rows", "--sets", "1"]).success();
    run(data_dir, &["plan", "move", "monday", "2", "0"]).success();
    run(data_dir, &["plan", "remove", "monday", "1"]).success();

    run(data_dir, &["plan", "show", "monday"])
        .success()
        .stdout(predicate::str::contains("2 sets planned"))
        .stdout(predicate::str::contains("0. Rows (BW/Light) (Set 1)"))
        .stdout(predicate::str::contains("1. Dips (Set 1)"));

    run(data_dir, &["plan", "add", "monday", "ghost"])
        .failure()
        .stderr(predicate::str::contains("unknown exercise id"));
    run(data_dir, &["plan", "remove", "monday", "7"]).failure();
}

#[test]
fn test_plan_show_week() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["plan", "show"])
        .success()
        .stdout(predicate::str::contains("Monday"))
        .stdout(predicate::str::contains("Sunday"));
}

#[test]
fn test_exercise_library_edits() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(
        data_dir,
        &[
            "exercises", "add", "--name", "L-Sit", "--category", "Core", "--logging", "time",
            "--rest", "45", "--cue", "Lock elbows",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Created exercise l-sit"));

    run(data_dir, &["exercises", "edit", "l-sit", "--rest", "30"]).success();

    run(data_dir, &["exercises", "list"])
        .success()
        .stdout(predicate::str::contains("l-sit"))
        .stdout(predicate::str::contains("rest 30s"));

    run(
        data_dir,
        &["exercises", "add", "--name", "Sprint", "--category", "Speed"],
    )
    .failure()
    .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn test_categories() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["categories", "add", "Grip"]).success();
    run(data_dir, &["categories", "add", "Grip"]).failure();
    run(data_dir, &["categories", "list"])
        .success()
        .stdout(predicate::str::contains("Grip"));

    run(data_dir, &["categories", "remove", "Core"]).success();
    run(data_dir, &["exercises", "list"])
        .success()
        .stderr(predicate::str::contains("unknown category 'Core'"));
}

#[test]
fn test_history_and_clear() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["history"])
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));

    run(data_dir, &["start", "tuesday", "--auto-complete"]).success();

    run(data_dir, &["history"])
        .success()
        .stdout(predicate::str::contains("Tuesday"))
        .stdout(predicate::str::contains("Wall Line Holds #5"));

    run(data_dir, &["history", "--clear"])
        .success()
        .stdout(predicate::str::contains("Deleted 1 workout"));
    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let output = data_dir.join("export.csv");

    run(data_dir, &["start", "tuesday", "--auto-complete"]).success();

    cli()
        .args(["export", "--output"])
        .arg(&output)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 10 sets"));

    let csv = fs::read_to_string(&output).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(r#""Date","Day","Exercise","Set Number","Value","Type""#)
    );
    assert!(lines.all(|l| l.ends_with(r#""Seconds""#)));
}

#[test]
fn test_failed_save_reports_no_success() {
    let temp_dir = setup_test_dir();
    let blocker = temp_dir.path().join("not_a_dir");
    fs::write(&blocker, "").unwrap();

    run(&blocker, &["categories", "add", "Grip"])
        .failure()
        .stdout(predicate::str::contains("✓").not());

    run(&blocker, &["plan", "clear", "monday"])
        .failure()
        .stdout(predicate::str::contains("Cleared").not());
}

#[cfg(target_os = "linux")]
#[test]
fn test_invalid_export_date_format_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_home = temp_dir.path().join("config");
    fs::create_dir_all(config_home.join("flexilog")).unwrap();
    fs::write(
        config_home.join("flexilog/config.toml"),
        "[export]\ndate_format = \"%Y-%Q\"\n",
    )
    .unwrap();
    let output = temp_dir.path().join("export.csv");

    cli()
        .env("XDG_CONFIG_HOME", &config_home)
        .args(["export", "--output"])
        .arg(&output)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date format"));

    assert!(!output.exists());
}

#[test]
fn test_export_without_history() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["export"])
        .success()
        .stdout(predicate::str::contains("No workouts to export"));
}
