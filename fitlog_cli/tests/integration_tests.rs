//! Integration tests for the fitlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Adding, listing, removing and clearing workouts
//! - Statistics output
//! - Persistence between invocations in both storage layouts

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

/// CLI pointed at `dir`, isolated from any real user config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitlog"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn add(dir: &Path, date: &str, exercise: &str, duration: &str, calories: &str) {
    cli(dir)
        .args(["add", "--date", date, "--exercise", exercise])
        .args(["--duration", duration, "--calories", calories])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout added"));
}

fn list_json(dir: &Path) -> Vec<Value> {
    let output = cli(dir).args(["list", "--json"]).output().expect("run list");
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    value.as_array().expect("array").clone()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("fitlog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal workout log and statistics"));
}

#[test]
fn test_empty_history() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts recorded yet."));

    // Reading never creates the file
    assert!(!temp_dir.path().join("data/workouts.csv").exists());
}

#[test]
fn test_add_then_list_persists() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    add(dir, "2024-01-01", "Running", "30", "300");
    add(dir, "2024-01-02", "Cycling", "45", "400");

    let records = list_json(dir);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["exercise_type"], "Running");
    assert_eq!(records[0]["date"], "2024-01-01");
    assert_eq!(records[1]["exercise_type"], "Cycling");
    assert_eq!(records[1]["duration_minutes"], 45);
    assert_eq!(records[1]["calories_burned"], 400);

    let contents = fs::read_to_string(dir.join("data/workouts.csv")).unwrap();
    assert_eq!(
        contents,
        "Date,Exercise Type,Duration (min),Calories Burned\n\
         2024-01-01,Running,30,300\n\
         2024-01-02,Cycling,45,400\n"
    );

    cli(dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running").and(predicate::str::contains("Cycling")));
}

#[test]
fn test_stats_scenario() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    add(dir, "2024-01-01", "Running", "30", "300");
    add(dir, "2024-01-02", "Cycling", "45", "400");

    cli(dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Workouts: 2"))
        .stdout(predicate::str::contains("Total Duration: 75 min"))
        .stdout(predicate::str::contains("Total Calories Burned: 700 kcal"))
        .stdout(predicate::str::contains("Avg Duration per Workout: 37.50 min"));

    let output = cli(dir).args(["stats", "--json"]).output().unwrap();
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_workouts"], 2);
    assert_eq!(stats["total_duration_minutes"], 75);
    assert_eq!(stats["total_calories_burned"], 700);
    assert_eq!(stats["average_duration_minutes"], 37.5);
}

#[test]
fn test_stats_when_empty() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts recorded yet."))
        .stdout(predicate::str::contains("Total Workouts").not());

    let output = cli(temp_dir.path()).args(["stats", "--json"]).output().unwrap();
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_workouts"], 0);
    assert_eq!(stats["average_duration_minutes"], 0.0);
}

#[test]
fn test_invalid_add_is_rejected() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    add(dir, "2024-01-01", "Running", "30", "300");

    cli(dir)
        .args(["add", "--date", "2024-01-01", "--exercise", ""])
        .args(["--duration", "10", "--calories", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exerciseType"));

    cli(dir)
        .args(["add", "--date", "2024-01-01", "--exercise", "Rowing"])
        .args(["--duration", "0", "--calories", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("durationMinutes"));

    cli(dir)
        .args(["add", "--date", "someday", "--exercise", "Rowing"])
        .args(["--duration", "10", "--calories", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("date"));

    assert_eq!(list_json(dir).len(), 1);
}

#[test]
fn test_add_defaults_to_today() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["add", "--exercise", "Walk", "--duration", "20", "--calories", "90"])
        .assert()
        .success();

    let records = list_json(dir);
    assert_eq!(records.len(), 1);
    assert!(records[0]["date"].as_str().unwrap().len() == 10);
}

#[test]
fn test_remove_and_clear() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    add(dir, "2024-01-01", "Running", "30", "300");
    add(dir, "2024-01-02", "Cycling", "45", "400");

    cli(dir)
        .args(["remove", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
    assert_eq!(list_json(dir).len(), 2);

    cli(dir)
        .args(["remove", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout removed: 2024-01-01 Running"));

    let records = list_json(dir);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["exercise_type"], "Cycling");

    cli(dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("All workouts cleared"));
    assert!(list_json(dir).is_empty());
}

#[test]
fn test_delimited_format() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["--format", "delimited", "add", "--date", "01/05/24"])
        .args(["--exercise", "Yoga", "--duration", "60", "--calories", "150"])
        .assert()
        .success();

    let contents = fs::read_to_string(dir.join("data/workouts.txt")).unwrap();
    assert_eq!(contents, "2024-01-05,Yoga,60,150\n");

    let output = cli(dir)
        .args(["--format", "delimited", "list", "--json"])
        .output()
        .unwrap();
    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records[0]["exercise_type"], "Yoga");
}

#[test]
fn test_config_file_selects_format() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let config_dir = dir.join("config/fitlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[storage]\nformat = \"delimited\"\nfile_name = \"log.txt\"\n",
    )
    .unwrap();

    add(dir, "2024-03-01", "Climbing", "90", "500");
    assert!(dir.join("data/log.txt").exists());
}
