//! Explicit configuration for a packaging run.

use std::path::{Path, PathBuf};

/// Inputs of one packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    project_path: PathBuf,
    output_path: Option<PathBuf>,
    clean: bool,
    verbose: bool,
    scratch_dir: Option<PathBuf>,
    build: BuildSettings,
}

impl PackOptions {
    /// Creates options for packaging the project at `project_path`.
    #[must_use]
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            output_path: None,
            clean: false,
            verbose: false,
            scratch_dir: None,
            build: BuildSettings::default(),
        }
    }

    /// Overrides the final archive path.
    #[must_use]
    pub fn with_output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    /// Runs the clean step before building.
    #[must_use]
    pub const fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Echoes command output and per-candidate discovery failures.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Creates temporary locations under `scratch_dir` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(scratch_dir.into());
        self
    }

    /// Replaces the toolchain settings.
    #[must_use]
    pub fn with_build_settings(mut self, build: BuildSettings) -> Self {
        self.build = build;
        self
    }

    /// Path to the project's `Cargo.toml`.
    #[must_use]
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Requested final archive path, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Whether the clean step runs.
    #[must_use]
    pub const fn clean(&self) -> bool {
        self.clean
    }

    /// Whether diagnostic output is echoed.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Parent directory for temporary locations, if overridden.
    #[must_use]
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Toolchain settings.
    #[must_use]
    pub const fn build(&self) -> &BuildSettings {
        &self.build
    }
}

/// How cargo is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    cargo: PathBuf,
    profile: String,
    target_dir: Option<PathBuf>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cargo: PathBuf::from("cargo"),
            profile: String::from("release"),
            target_dir: None,
        }
    }
}

impl BuildSettings {
    /// Sets the program used to invoke cargo.
    #[must_use]
    pub fn with_cargo(mut self, cargo: impl Into<PathBuf>) -> Self {
        self.cargo = cargo.into();
        self
    }

    /// Sets the cargo profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Overrides cargo's target directory.
    #[must_use]
    pub fn with_target_dir(mut self, target_dir: Option<PathBuf>) -> Self {
        self.target_dir = target_dir;
        self
    }

    /// Program used to invoke cargo.
    #[must_use]
    pub fn cargo(&self) -> &Path {
        &self.cargo
    }

    /// Cargo profile.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Target directory override.
    #[must_use]
    pub fn target_dir(&self) -> Option<&Path> {
        self.target_dir.as_deref()
    }
}
