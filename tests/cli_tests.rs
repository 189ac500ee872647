//! End-to-end tests of the modup binary
//!
//! Network-free scenarios only: argument validation, manifest loading
//! failures and the trivial success path of a go.mod without dependencies.

use assert_cmd::Command;
use predicates::prelude::*;

fn modup() -> Command {
    Command::cargo_bin("modup").expect("binary not built")
}

#[test]
fn test_help_lists_flags() {
    modup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--exclude-indirect"))
        .stdout(predicate::str::contains("--major-minor"))
        .stdout(predicate::str::contains("--only-releases"))
        .stdout(predicate::str::contains("--force-update"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_print_version_keeps_checking() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("go.mod"),
        "module example.com/empty\n\ngo 1.21\n",
    )
    .unwrap();
    modup()
        .arg("-V")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_print_version_still_fails_on_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    modup()
        .args(["--print-version"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_major_and_major_minor_are_exclusive() {
    modup().args(["-M", "-m"]).assert().failure();
}

#[test]
fn test_missing_go_mod_fails() {
    let dir = tempfile::tempdir().unwrap();
    modup()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_invalid_go_mod_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("go.mod"), "go 1.21\n").unwrap();
    modup()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid go.mod"));
}

#[test]
fn test_empty_go_mod_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("go.mod"),
        "module example.com/empty\n\ngo 1.21\n",
    )
    .unwrap();
    modup()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
