#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(dataset: &Path) -> Command {
    let mut cmd = Command::cargo_bin("groundplan-cli").unwrap();
    cmd.arg("--dataset").arg(dataset);
    cmd
}

#[test]
fn compute_without_slots_reports_empty_window() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("station.json");
    cli(&dataset)
        .args(["compute", "--start", "2024-01-15"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to staff"));
}

#[test]
fn staff_slot_and_program_end_to_end() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("station.json");

    cli(&dataset)
        .args(["add-staff", "--name", "Marie Sorel", "--initials", "MS-ATZ", "--skills", "Ramp;LC"])
        .assert()
        .success();
    cli(&dataset)
        .args([
            "add-staff", "--name", "Luc Martin", "--initials", "LM", "--roster",
            "--contract-from", "2024-01-01", "--contract-to", "2024-01-10",
        ])
        .assert()
        .success();
    cli(&dataset)
        .args([
            "add-slot", "--pickup-date", "45306", "--pickup-time", "2200",
            "--release-time", "06:00", "--min-staff", "1", "--max-staff", "2", "--role", "Ramp=2",
        ])
        .assert()
        .success();

    cli(&dataset)
        .args(["resolve", "--text", "ms, zz"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("MS-ATZ"))
        .stderr(predicate::str::contains("Unmatched: zz"));

    cli(&dataset)
        .args(["add-rest-log", "--staff", "MS-ATZ", "--from", "2024-01-14", "--to", "2024-01-16", "--end-time", "23:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rest log"));

    cli(&dataset)
        .args(["list-slots", "--start", "2024-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2x Ramp"));

    let out = dir.path().join("input.json");
    cli(&dataset)
        .args(["compute", "--start", "2024-01-15", "--out"])
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["active_shifts"].as_array().unwrap().len(), 1);
    assert_eq!(json["active_shifts"][0]["release_date"], "2024-01-16");
    assert_eq!(json["eligible_staff"].as_array().unwrap().len(), 1);
    assert_eq!(json["absences"]["rest_logs"].as_array().unwrap().len(), 3);
}

#[test]
fn malformed_slot_is_rejected() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("station.json");
    cli(&dataset)
        .args([
            "add-slot", "--pickup-date", "2024-01-15", "--pickup-time", "06:00",
            "--release-time", "14:00", "--min-staff", "4", "--max-staff", "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min staff 4 exceeds max staff 2"));
    assert!(!dataset.exists());
}

#[test]
fn delete_removes_slot_by_id_and_rejects_unknown_ids() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("station.json");

    let out = cli(&dataset)
        .args([
            "add-slot", "--pickup-date", "2024-01-15", "--pickup-time", "06:00",
            "--release-time", "14:00",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let slot_id = String::from_utf8(out.stdout).unwrap().trim().to_string();

    cli(&dataset)
        .args(["delete", "--kind", "slot", "--id", &slot_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(slot_id.as_str()));
    cli(&dataset)
        .args(["list-slots", "--start", "2024-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    cli(&dataset)
        .args(["delete", "--kind", "rest-log", "--id", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown record: ghost"));
}
