//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use flowpack_config::Config;
use rstest::rstest;
use tempfile::TempDir;

use crate::{AppError, ConfigLoader, IoStreams, OrthoConfigLoader, run_with_loader};

/// A config loader that panics if called, proving that the run ended before
/// configuration loading.
struct PanickingLoader;

impl ConfigLoader for PanickingLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        panic!("configuration must not be loaded");
    }
}

/// A config loader returning built-in defaults.
struct DefaultLoader;

impl ConfigLoader for DefaultLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(Config::default())
    }
}

struct Captured {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str], loader: &impl ConfigLoader) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);
    let exit = run_with_loader(args.iter().map(OsString::from), &mut io, loader);
    Captured {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[test]
fn bare_invocation_prints_usage_and_succeeds() {
    let captured = invoke(&["flowpack"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("Usage: flowpack"), "{}", captured.stdout);
    assert!(captured.stderr.is_empty());
}

#[test]
fn help_flag_prints_usage_and_succeeds() {
    let captured = invoke(&["flowpack", "--help"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("--output"));
    assert!(captured.stdout.contains("--clean"));
}

#[rstest]
#[case("-v")]
#[case("--version")]
fn version_flags_print_the_version(#[case] flag: &str) {
    let captured = invoke(&["flowpack", flag], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(
        captured.stdout,
        format!("flowpack {}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn unknown_flags_are_usage_errors() {
    let captured = invoke(&["flowpack", "--frobnicate"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("error:"));
    assert!(captured.stdout.is_empty());
}

#[test]
fn flags_without_a_project_fail() {
    let captured = invoke(&["flowpack", "--clean"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("project file must be provided"));
}

#[test]
fn missing_project_file_fails() {
    let dir = TempDir::new().expect("create temp dir");
    let project = dir.path().join("Cargo.toml");
    let project_arg = project.to_str().expect("utf8 path");

    let captured = invoke(&["flowpack", project_arg], &DefaultLoader);

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.starts_with("error: project file not found"));
}

#[test]
fn wrong_output_extension_fails_before_building() {
    let dir = TempDir::new().expect("create temp dir");
    let project = dir.path().join("Cargo.toml");
    fs::write(&project, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n")
        .expect("write project file");
    let project_arg = project.to_str().expect("utf8 path");
    let output = dir.path().join("foo.zip");
    let output_arg = output.to_str().expect("utf8 path");

    let captured = invoke(
        &["flowpack", project_arg, "--output", output_arg],
        &DefaultLoader,
    );

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("must end in .fspack"), "{}", captured.stderr);
    assert!(!dir.path().join("target").exists());
    assert!(!output.exists());
}

fn write_project(dir: &TempDir) -> String {
    let project = dir.path().join("Cargo.toml");
    fs::write(&project, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n")
        .expect("write project file");
    project.to_str().expect("utf8 path").to_owned()
}

#[test]
fn layered_configuration_loads_without_config_flags() {
    let dir = TempDir::new().expect("create temp dir");
    let project_arg = write_project(&dir);
    let output = dir.path().join("foo.zip");
    let output_arg = output.to_str().expect("utf8 path");

    let captured = invoke(
        &["flowpack", &project_arg, "--output", output_arg],
        &OrthoConfigLoader,
    );

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(!captured.stderr.contains("configuration"), "{}", captured.stderr);
    assert!(captured.stderr.contains("must end in .fspack"), "{}", captured.stderr);
}

#[test]
fn configured_cargo_program_drives_the_build() {
    let dir = TempDir::new().expect("create temp dir");
    let project_arg = write_project(&dir);
    let cargo = dir.path().join("missing-cargo");
    let cargo_arg = cargo.to_str().expect("utf8 path");
    let output = dir.path().join("demo.fspack");
    let output_arg = output.to_str().expect("utf8 path");

    let captured = invoke(
        &[
            "flowpack",
            "--cargo-path",
            cargo_arg,
            "--build-profile=dev",
            &project_arg,
            "--output",
            output_arg,
        ],
        &OrthoConfigLoader,
    );

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("failed to start"), "{}", captured.stderr);
    assert!(captured.stderr.contains("missing-cargo"), "{}", captured.stderr);
    assert!(!output.exists());
}
