use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(rules: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("words.txt"), "alpha\nbeta\n").unwrap();
        fs::write(dir.path().join("test.rule"), rules).unwrap();
        Self { dir }
    }

    fn preprocess_dir(&self) -> PathBuf {
        self.dir.path().join("pre")
    }

    /// `sh -c cat` echoes the prefixed wordlist back, standing in for an engine
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ruleinv").unwrap();
        cmd.arg("preprocess")
            .arg(self.dir.path().join("test.rule"))
            .arg("--wordlist")
            .arg(self.dir.path().join("words.txt"))
            .arg("--dir")
            .arg(self.preprocess_dir())
            .arg("--engine")
            .arg("sh")
            .arg("--engine-arg=-c")
            .arg("--engine-arg=cat");
        cmd
    }
}

#[cfg(unix)]
#[test]
fn test_cli_preprocess_writes_forward_data() {
    let ws = Workspace::new("c $1\nc !a\n@a\n");

    ws.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("2 forward job(s) run"));

    let dir = ws.preprocess_dir();
    assert_eq!(fs::read_to_string(dir.join("rule2.txt")).unwrap(), "alpha\nbeta\n");
    assert_eq!(fs::read_to_string(dir.join("rule2.count")).unwrap(), "2\n");
    assert_eq!(fs::read_to_string(dir.join("count/rule1.txt")).unwrap(), "2\n");
    assert!(!dir.join("rule0.txt").exists());
    assert_eq!(fs::read_to_string(dir.join("hash")).unwrap().trim().len(), 64);
}

#[cfg(unix)]
#[test]
fn test_cli_preprocess_second_run_hits_cache() {
    let ws = Workspace::new("@a\n");
    ws.command().assert().success();

    ws.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache up to date"));
}

#[cfg(unix)]
#[test]
fn test_cli_preprocess_prefix() {
    let ws = Workspace::new("@a\n");
    ws.command().arg("--prefix").arg("x").assert().success();

    assert_eq!(
        fs::read_to_string(ws.preprocess_dir().join("rule0.txt")).unwrap(),
        "xalpha\nxbeta\n"
    );
}

#[cfg(unix)]
#[test]
fn test_cli_preprocess_json_report() {
    let ws = Workspace::new("c\n@a\n");
    let output = ws.command().arg("--json").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["cache_hit"], false);
    assert_eq!(report["forward_jobs"], 1);
    assert_eq!(report["rules"][1]["forward_count"], 2);
}

#[cfg(unix)]
#[test]
fn test_cli_preprocess_engine_failure_exits_nonzero() {
    let ws = Workspace::new("@a\n");
    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("preprocess")
        .arg(ws.dir.path().join("test.rule"))
        .arg("-w")
        .arg(ws.dir.path().join("words.txt"))
        .arg("-d")
        .arg(ws.preprocess_dir())
        .arg("--engine")
        .arg("sh")
        .arg("--engine-arg=-c")
        .arg("--engine-arg=echo boom >&2; exit 3");

    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("boom"));
    assert!(!ws.preprocess_dir().join("hash").exists());
}

#[test]
fn test_cli_preprocess_config_file() {
    let ws = Workspace::new("c\n");
    let config = ws.dir.path().join("ruleinv.json");
    fs::write(
        &config,
        format!(
            r#"{{"wordlist_path": {{"name": {:?}}}, "preprocess_path": {:?}}}"#,
            ws.dir.path().join("words.txt").to_string_lossy(),
            ws.preprocess_dir().to_string_lossy()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("preprocess")
        .arg(ws.dir.path().join("test.rule"))
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 forward job(s) run"));
    assert!(ws.preprocess_dir().join("hash").exists());
}

#[test]
fn test_cli_preprocess_requires_wordlist() {
    let ws = Workspace::new("c\n");
    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("preprocess").arg(ws.dir.path().join("test.rule"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("wordlist_path.name"));
}
