//! Corruption recovery tests for the flexilog binary.
//!
//! These tests verify the system can handle:
//! - Corrupted state slices
//! - Slices from another schema version
//! - Corrupted history lines

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("flexilog"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_slices_fall_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("exercises.json"), "{ invalid json }}}}").unwrap();
    fs::write(data_dir.join("schedule_v2.json"), "[1, 2").unwrap();

    cli()
        .args(["start", "monday", "--auto-complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("18 sets recorded"));
}

#[test]
fn test_old_schema_version_is_replaced_on_save() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("categories.json"),
        r#"{"schema_version":1,"data":["Legacy"]}"#,
    )
    .unwrap();

    cli()
        .args(["categories", "add", "Grip", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success();

    let saved = fs::read_to_string(data_dir.join("categories.json")).unwrap();
    assert!(saved.contains("\"schema_version\":2"));
    assert!(saved.contains("Strength"));
    assert!(saved.contains("Grip"));
    assert!(!saved.contains("Legacy"));
}

#[test]
fn test_corrupted_history_line_is_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["start", "tuesday", "--auto-complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success();

    {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(data_dir.join("history.jsonl"))
            .unwrap();
        writeln!(file, "{{\"id\": \"partial").unwrap();
    }

    cli()
        .args(["start", "thursday", "--auto-complete", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .args(["history", "--data-dir"])
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tuesday"))
        .stdout(predicate::str::contains("Thursday"));
}
