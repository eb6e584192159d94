use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn wordlist(temp_dir: &TempDir) -> std::path::PathBuf {
    let path = temp_dir.path().join("words.txt");
    fs::write(&path, "cat\ncar\nbat\ndog\ncats\n").unwrap();
    path
}

#[test]
fn test_cli_lookup_from_wordlist() {
    let temp_dir = TempDir::new().unwrap();
    let words = wordlist(&temp_dir);

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("lookup").arg("[bc]a[tr]").arg("--wordlist").arg(&words);

    cmd.assert().success().stdout("bat\ncar\ncat\n");
}

#[test]
fn test_cli_lookup_count() {
    let temp_dir = TempDir::new().unwrap();
    let words = wordlist(&temp_dir);

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("lookup")
        .arg("?l?l?l")
        .arg("?l?l?l?l")
        .arg("--count")
        .arg("-w")
        .arg(&words);

    cmd.assert().success().stdout("4\n1\n");
}

#[test]
fn test_cli_freeze_then_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let words = wordlist(&temp_dir);
    let trie = temp_dir.path().join("words.trie");

    let mut freeze = Command::cargo_bin("ruleinv").unwrap();
    freeze
        .arg("freeze")
        .arg("--wordlist")
        .arg(&words)
        .arg("--output")
        .arg(&trie);
    freeze
        .assert()
        .success()
        .stdout(predicate::str::contains("Froze 5 words"));

    let mut lookup = Command::cargo_bin("ruleinv").unwrap();
    lookup.arg("lookup").arg("ca?l").arg("--trie").arg(&trie);
    lookup.assert().success().stdout("car\ncat\n");
}

#[test]
fn test_cli_lookup_rejects_corrupt_trie() {
    let temp_dir = TempDir::new().unwrap();
    let trie = temp_dir.path().join("broken.trie");
    fs::write(&trie, b"not a trie").unwrap();

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("lookup").arg("abc").arg("--trie").arg(&trie);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid trie data"));
}

#[test]
fn test_cli_lookup_bad_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let words = wordlist(&temp_dir);

    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("lookup").arg("?q").arg("--wordlist").arg(&words);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid token pattern"));
}

#[test]
fn test_cli_lookup_requires_a_source() {
    let mut cmd = Command::cargo_bin("ruleinv").unwrap();
    cmd.arg("lookup").arg("abc");

    cmd.assert().failure();
}
