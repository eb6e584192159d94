use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_classify_rule_file() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("best.rule");
    fs::write(&rule_file, "c $1\n@a\n").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("classify").arg(&rule_file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("c $1"))
        .stdout(predicate::str::contains("outputs+count"))
        .stdout(predicate::str::contains("2 rule(s): 1 invertible"));
}

#[test]
fn test_cli_classify_json() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("best.rule");
    fs::write(&rule_file, "c $1\nc !a\n").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    let output = cmd.arg("classify").arg(&rule_file).arg("--json").output().unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["invertibility"], "invertible");
    assert_eq!(summaries[0]["action"], "nothing");
    assert_eq!(summaries[1]["action"], "count_only");
}

#[test]
fn test_cli_classify_directory_in_file_name_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("b.rule"), "@a\n").unwrap();
    fs::write(temp_dir.path().join("a.rule"), "c\n").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not a rule file ~~~\n").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    let output = cmd
        .arg("classify")
        .arg(temp_dir.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let raws: Vec<&str> = summaries
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["raw"].as_str().unwrap())
        .collect();
    assert_eq!(raws, vec!["c", "@a"]);
}

#[test]
fn test_cli_classify_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("bad.rule");
    fs::write(&rule_file, "c\n$\n").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("classify").arg(&rule_file);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_cli_classify_lenient_keeps_valid_rules() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("mixed.rule");
    fs::write(&rule_file, "c\n$\nu\n").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("classify").arg(&rule_file).arg("--lenient");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 rule(s)"))
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_cli_classify_missing_source() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("classify").arg(temp_dir.path().join("nope.rule"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
