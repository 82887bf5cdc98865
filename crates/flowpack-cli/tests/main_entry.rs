//! Integration tests for the `flowpack` binary entry point.
//!
//! Verifies exit codes and user-facing output for help, version and
//! argument-validation paths that never reach the build.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, starts_with};
use tempfile::TempDir;

#[test]
fn bare_invocation_prints_help() {
    let mut command = cargo_bin_cmd!("flowpack");
    command
        .assert()
        .success()
        .stdout(contains("Usage: flowpack"));
}

#[test]
fn help_flag_succeeds() {
    let mut command = cargo_bin_cmd!("flowpack");
    command.arg("-h");
    command.assert().success().stdout(contains("PROJECT"));
}

#[test]
fn version_flag_prints_version() {
    let mut command = cargo_bin_cmd!("flowpack");
    command.arg("--version");
    command
        .assert()
        .success()
        .stdout(starts_with("flowpack ").and(contains(env!("CARGO_PKG_VERSION"))));
}

#[test]
fn missing_project_exits_with_failure() {
    let dir = TempDir::new().expect("create temp dir");
    let mut command = cargo_bin_cmd!("flowpack");
    command.current_dir(dir.path()).arg("absent/Cargo.toml");
    command
        .assert()
        .code(1)
        .stderr(contains("project file not found"));
}

#[test]
fn wrong_output_extension_exits_without_building() {
    let dir = TempDir::new().expect("create temp dir");
    let project = dir.path().join("Cargo.toml");
    fs::write(&project, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n")
        .expect("write project file");

    let mut command = cargo_bin_cmd!("flowpack");
    command
        .current_dir(dir.path())
        .arg(&project)
        .args(["--output", "foo.zip"]);
    command
        .assert()
        .code(1)
        .stderr(contains("must end in .fspack"));

    assert!(!dir.path().join("target").exists());
    assert!(!dir.path().join("foo.zip").exists());
}
