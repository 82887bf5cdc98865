//! Packaging pipeline for FlowPack plugins.
//!
//! The `flowpack-packager` crate turns a cargo plugin project into a single
//! `.fspack` archive. A run builds the project, copies the resulting `cdylib`
//! into a private publish directory, loads it transiently through
//! [`flowpack_host`] to read the plugin's metadata, and then writes three
//! entries into the final archive:
//!
//! - `{project}.plugin`, a zip of the publish directory;
//! - `manifest.json`, the plugin metadata;
//! - `{project}.plugin.sha256`, the lowercase hex SHA-256 of the artifact.
//!
//! External commands go through the [`CommandRunner`] trait and modules are
//! loaded through [`flowpack_host::ModuleLoader`], so both seams can be
//! replaced in tests. Every temporary location lives under one
//! [`PackagingJob`] directory that is removed whether the run succeeds or not.

pub mod archive;
pub mod checksum;
pub mod command;
pub mod error;
pub mod job;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod project;
pub mod stage;
pub mod toolchain;

#[cfg(test)]
mod tests;

/// Tracing target for pipeline progress.
pub const PIPELINE_TARGET: &str = "flowpack::pipeline";

pub use self::command::{CommandOutput, CommandRunner, ProcessRunner};
pub use self::error::PackError;
pub use self::job::PackagingJob;
pub use self::options::{BuildSettings, PackOptions};
pub use self::pipeline::{PackageReport, Packager};
pub use self::project::{PACKAGE_EXTENSION, Project, validate_output_path};
pub use self::stage::Stage;
