//! Domain errors raised by packaging runs.
//!
//! I/O errors are wrapped in `Arc` to satisfy the `result_large_err` Clippy
//! lint and always carry the path they concern.

use std::path::PathBuf;
use std::sync::Arc;

use flowpack_host::HostError;
use thiserror::Error;

use crate::stage::Stage;

/// Errors arising from a packaging run.
#[derive(Debug, Error)]
pub enum PackError {
    /// The project path does not reference an existing file.
    #[error("project file not found: {path}")]
    ProjectNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The project path is not a cargo manifest.
    #[error("{path} is not a project file; expected a path to Cargo.toml")]
    NotAProjectFile {
        /// Offending path.
        path: PathBuf,
    },

    /// The project file could not be parsed.
    #[error("failed to parse project file {path}: {message}")]
    ParseProject {
        /// Project file path.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The project file declares no package.
    #[error("project file {path} has no [package] name")]
    MissingPackageName {
        /// Project file path.
        path: PathBuf,
    },

    /// The requested output path lacks the package extension.
    #[error("output path {path} must end in .fspack")]
    InvalidOutputExtension {
        /// Offending path.
        path: PathBuf,
    },

    /// An external command could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The output of an external command could not be collected.
    #[error("failed to collect output of '{program}': {message}")]
    CollectOutput {
        /// Program that was invoked.
        program: String,
        /// Description of the failure.
        message: String,
    },

    /// An external command exited unsuccessfully.
    #[error("{stage} step failed ({status}):\n{diagnostics}", status = describe_status(.status.as_ref()))]
    CommandFailed {
        /// Step that ran the command.
        stage: Stage,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured diagnostic output.
        diagnostics: String,
    },

    /// The build reported no loadable module.
    #[error("the build produced no loadable plugin module")]
    NoBuildArtifacts,

    /// No published module exposes a plugin.
    #[error("no plugin found in {directory}")]
    PluginNotFound {
        /// Directory that was scanned.
        directory: PathBuf,
    },

    /// The plugin host failed outside per-candidate discovery.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Metadata could not be serialised into the manifest.
    #[error("failed to serialise manifest: {0}")]
    SerializeManifest(#[source] serde_json::Error),

    /// A manifest file could not be parsed.
    #[error("failed to parse manifest {path}: {source}")]
    ParseManifest {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An archive could not be written.
    #[error("failed to write archive {path}: {source}")]
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Underlying archive error.
        #[source]
        source: Arc<zip::result::ZipError>,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation concerned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PackError {
    /// Wraps an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Wraps an archive error with the archive path.
    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns the pipeline step that raised the error, when it is known.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::ProjectNotFound { .. }
            | Self::NotAProjectFile { .. }
            | Self::ParseProject { .. }
            | Self::MissingPackageName { .. }
            | Self::InvalidOutputExtension { .. } => Some(Stage::Validate),
            Self::CommandFailed { stage, .. } => Some(*stage),
            Self::NoBuildArtifacts => Some(Stage::Publish),
            Self::PluginNotFound { .. } | Self::Host(_) => Some(Stage::DiscoverMetadata),
            Self::SerializeManifest(_) => Some(Stage::SaveManifest),
            Self::Spawn { .. }
            | Self::CollectOutput { .. }
            | Self::ParseManifest { .. }
            | Self::Archive { .. }
            | Self::Io { .. } => None,
        }
    }
}

fn describe_status(status: Option<&i32>) -> String {
    status.map_or_else(
        || String::from("terminated by signal"),
        |code| format!("exit code {code}"),
    )
}
