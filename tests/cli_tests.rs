mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::{demo_snapshot, pair_config, write_temp_config};

fn smilearb() -> Command {
    Command::cargo_bin("smilearb").expect("binary built")
}

#[test]
fn expiries_prints_requested_count() {
    let output = smilearb().args(["expiries", "3"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines
        .iter()
        .all(|l| l.len() == 8 && l.chars().all(|c| c.is_ascii_digit())));
    assert!(lines.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn expiries_accepts_cboe_flag() {
    smilearb()
        .args(["expiries", "5", "--cboe"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(\d{8}\n){5}$").unwrap());
}

#[test]
fn check_config_accepts_valid_file() {
    let file = write_temp_config(&pair_config(Some(&demo_snapshot())));
    smilearb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("GDX / NUGT"));
}

#[test]
fn check_config_rejects_invalid_value() {
    let toml = format!("{}\n[arb]\nsafety_margin = 0.0\n", pair_config(None));
    let file = write_temp_config(&toml);
    smilearb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("arb.safety_margin"));
}

#[test]
fn check_config_reports_syntax_error() {
    let file = write_temp_config("[pair]\nunlevered = \n");
    smilearb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure();
}

#[test]
fn scan_prints_json_result() {
    let file = write_temp_config(&pair_config(Some(&demo_snapshot())));
    let output = smilearb()
        .args(["scan", "--json", "--config"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["unlevered"], "GDX");
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 3);
    assert_eq!(json["outcomes"][2]["status"], "skipped");
    let spread = json["best"]["spread"].as_f64().unwrap();
    assert!((spread - 9.0).abs() < 1e-6);
}

#[test]
fn scan_renders_table() {
    let file = write_temp_config(&pair_config(None));
    smilearb()
        .args(["scan", "--expiries", "2", "--config"])
        .arg(file.path())
        .arg("--snapshot")
        .arg(demo_snapshot())
        .assert()
        .success()
        .stdout(predicate::str::contains("Best selection"))
        .stdout(predicate::str::contains("NUGT 20191025 40C"));
}

#[test]
fn scan_without_snapshot_fails() {
    let file = write_temp_config(&pair_config(None));
    smilearb()
        .args(["scan", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("data.snapshot"));
}
