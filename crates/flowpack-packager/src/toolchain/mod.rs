//! Cargo invocations for the clean, build and publish steps.
//!
//! Publishing rebuilds the project with machine-readable output and copies
//! every `cdylib` module cargo reports into the publish directory. The
//! rebuild is a no-op for cargo when the build step has just run, so the
//! artifact list comes for free.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::PackError;
use crate::options::BuildSettings;

/// Tracing target for toolchain operations.
const TOOLCHAIN_TARGET: &str = "flowpack::toolchain";

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Program to run.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// Composes cargo invocations for one project.
#[derive(Debug, Clone, Copy)]
pub struct CargoToolchain<'a> {
    settings: &'a BuildSettings,
    manifest_path: &'a Path,
}

impl<'a> CargoToolchain<'a> {
    /// Creates a toolchain for the project whose `Cargo.toml` is at
    /// `manifest_path`.
    #[must_use]
    pub const fn new(settings: &'a BuildSettings, manifest_path: &'a Path) -> Self {
        Self {
            settings,
            manifest_path,
        }
    }

    /// `cargo clean` for the configured profile.
    #[must_use]
    pub fn clean(&self) -> Invocation {
        self.invocation("clean", &[])
    }

    /// `cargo build` for the configured profile.
    #[must_use]
    pub fn build(&self) -> Invocation {
        self.invocation("build", &[])
    }

    /// `cargo build` with JSON messages, used to locate built modules.
    #[must_use]
    pub fn publish(&self) -> Invocation {
        self.invocation("build", &["--message-format", "json-render-diagnostics"])
    }

    fn invocation(&self, verb: &str, extra: &[&str]) -> Invocation {
        let mut args = vec![
            OsString::from(verb),
            OsString::from("--manifest-path"),
            self.manifest_path.as_os_str().to_owned(),
            OsString::from("--profile"),
            OsString::from(self.settings.profile()),
        ];
        if let Some(target_dir) = self.settings.target_dir() {
            args.push(OsString::from("--target-dir"));
            args.push(target_dir.as_os_str().to_owned());
        }
        args.extend(extra.iter().map(OsString::from));
        Invocation {
            program: self.settings.cargo().as_os_str().to_owned(),
            args,
        }
    }
}

#[derive(Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    target: Option<MessageTarget>,
    #[serde(default)]
    filenames: Vec<PathBuf>,
}

#[derive(Deserialize)]
struct MessageTarget {
    kind: Vec<String>,
}

/// Extracts loadable modules from cargo's JSON message stream.
///
/// Lines that are not JSON messages are ignored. Only `cdylib` targets are
/// considered, and only files carrying the platform's loadable-module
/// extension are returned, in the order cargo reported them.
#[must_use]
pub fn module_artifacts(stdout: &[String]) -> Vec<PathBuf> {
    let mut artifacts = Vec::new();
    for line in stdout {
        let Ok(message) = serde_json::from_str::<CargoMessage>(line) else {
            continue;
        };
        let is_cdylib = message
            .target
            .is_some_and(|target| target.kind.iter().any(|kind| kind == "cdylib"));
        if message.reason != "compiler-artifact" || !is_cdylib {
            continue;
        }
        artifacts.extend(message.filenames.into_iter().filter(|path| {
            path.extension()
                .is_some_and(|extension| extension == std::env::consts::DLL_EXTENSION)
        }));
    }
    artifacts
}

/// Copies `artifacts` into `publish_dir`, keeping their file names.
///
/// # Errors
///
/// Returns [`PackError::NoBuildArtifacts`] when `artifacts` is empty and
/// [`PackError::Io`] when a copy fails.
pub fn publish_artifacts(artifacts: &[PathBuf], publish_dir: &Path) -> Result<Vec<PathBuf>, PackError> {
    if artifacts.is_empty() {
        return Err(PackError::NoBuildArtifacts);
    }
    let mut published = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let Some(file_name) = artifact.file_name() else {
            continue;
        };
        let destination = publish_dir.join(file_name);
        fs::copy(artifact, &destination).map_err(|error| PackError::io(artifact, error))?;
        debug!(
            target: TOOLCHAIN_TARGET,
            from = %artifact.display(),
            to = %destination.display(),
            "published module"
        );
        published.push(destination);
    }
    Ok(published)
}
