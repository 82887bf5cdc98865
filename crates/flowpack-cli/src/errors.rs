//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use flowpack_packager::PackError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("a project file must be provided (see `flowpack --help`)")]
    MissingProject,
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
