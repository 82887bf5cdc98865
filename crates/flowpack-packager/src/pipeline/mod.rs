//! End-to-end orchestration of a packaging run.
//!
//! [`Packager::run`] executes the stages in a fixed order. Validation happens
//! before any temporary state exists; afterwards every exit path, successful
//! or not, passes through the [`PackagingJob`] guard, which removes the run's
//! temporary locations. The final archive is only opened once the artifact,
//! manifest and checksum are complete.

use std::env;
use std::path::{Path, PathBuf};

use flowpack_host::{HostOptions, ModuleLoader, PluginMetadata, discover_metadata};
use tracing::{debug, info};

use crate::PIPELINE_TARGET;
use crate::archive::{self, PackageEntry};
use crate::checksum::{self, CHECKSUM_EXTENSION};
use crate::command::CommandRunner;
use crate::error::PackError;
use crate::job::{PLUGIN_EXTENSION, PackagingJob};
use crate::manifest::{self, MANIFEST_FILE_NAME};
use crate::options::PackOptions;
use crate::project::Project;
use crate::stage::Stage;
use crate::toolchain::{self, CargoToolchain, Invocation};

/// Outcome of a successful packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    output_path: PathBuf,
    checksum: String,
    metadata: PluginMetadata,
}

impl PackageReport {
    /// Path of the written `.fspack` archive.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Lowercase hexadecimal SHA-256 of the packaged plugin artifact.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Metadata recorded in the package manifest.
    #[must_use]
    pub const fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }
}

/// Runs the packaging pipeline for one project.
#[derive(Debug)]
pub struct Packager<R, L> {
    options: PackOptions,
    runner: R,
    loader: L,
    working_dir: Option<PathBuf>,
}

impl<R: CommandRunner, L: ModuleLoader> Packager<R, L> {
    /// Creates a packager that builds with `runner` and inspects modules with
    /// `loader`.
    #[must_use]
    pub const fn new(options: PackOptions, runner: R, loader: L) -> Self {
        Self {
            options,
            runner,
            loader,
            working_dir: None,
        }
    }

    /// Resolves the default output path against `working_dir` instead of the
    /// process's current directory.
    #[must_use]
    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    /// Packages the project and returns where the archive was written.
    ///
    /// # Errors
    ///
    /// Returns a [`PackError`] from the first stage that fails. Temporary
    /// locations are removed before the error is returned.
    pub fn run(&self) -> Result<PackageReport, PackError> {
        info!(target: PIPELINE_TARGET, stage = %Stage::Validate, "packaging started");
        let project = Project::locate(self.options.project_path())?;
        let working_dir = self.working_dir()?;
        let output_path = project.output_path(self.options.output_path(), &working_dir)?;
        debug!(
            target: PIPELINE_TARGET,
            project = project.name(),
            output = %output_path.display(),
            "project validated"
        );

        let job = PackagingJob::create(self.options.scratch_dir(), project.name())?;
        let outcome = self.package(&project, &job, &output_path);

        info!(target: PIPELINE_TARGET, stage = %Stage::Cleanup, "removing temporary files");
        job.finish();
        outcome
    }

    fn working_dir(&self) -> Result<PathBuf, PackError> {
        match &self.working_dir {
            Some(path) => Ok(path.clone()),
            None => env::current_dir().map_err(|error| PackError::io(".", error)),
        }
    }

    fn package(
        &self,
        project: &Project,
        job: &PackagingJob,
        output_path: &Path,
    ) -> Result<PackageReport, PackError> {
        let toolchain = CargoToolchain::new(self.options.build(), project.manifest_path());

        if self.options.clean() {
            info!(target: PIPELINE_TARGET, stage = %Stage::Clean, "cleaning previous build output");
            if let Err(error) = self.run_step(Stage::Clean, &toolchain.clean()) {
                info!(target: PIPELINE_TARGET, %error, "clean step failed; continuing");
            }
        }

        info!(target: PIPELINE_TARGET, stage = %Stage::Build, "building project");
        self.run_step(Stage::Build, &toolchain.build())?;

        info!(target: PIPELINE_TARGET, stage = %Stage::Publish, "publishing build output");
        let messages = self.run_step(Stage::Publish, &toolchain.publish())?;
        let artifacts = toolchain::module_artifacts(&messages);
        toolchain::publish_artifacts(&artifacts, job.publish_dir())?;

        info!(target: PIPELINE_TARGET, stage = %Stage::DiscoverMetadata, "reading plugin metadata");
        let host_options = HostOptions::default().with_verbose(self.options.verbose());
        let metadata = discover_metadata(&self.loader, job.publish_dir(), host_options)?
            .ok_or_else(|| PackError::PluginNotFound {
                directory: job.publish_dir().to_path_buf(),
            })?;

        info!(target: PIPELINE_TARGET, stage = %Stage::SaveManifest, "writing manifest");
        let manifest_path = manifest::save(&metadata, job.manifest_dir())?;

        info!(target: PIPELINE_TARGET, stage = %Stage::ZipPluginArtifact, "archiving plugin");
        archive::zip_directory(job.publish_dir(), job.artifact_path())?;

        info!(target: PIPELINE_TARGET, stage = %Stage::ComputeChecksum, "hashing plugin artifact");
        let checksum = checksum::write_checksum(job.artifact_path(), job.checksum_path())?;

        info!(target: PIPELINE_TARGET, stage = %Stage::AssembleFinalArchive, "assembling package");
        let plugin_entry = format!("{}.{PLUGIN_EXTENSION}", project.name());
        let checksum_entry = format!("{plugin_entry}.{CHECKSUM_EXTENSION}");
        archive::write_package(
            output_path,
            &[
                PackageEntry::new(job.artifact_path(), &plugin_entry),
                PackageEntry::new(&manifest_path, MANIFEST_FILE_NAME),
                PackageEntry::new(job.checksum_path(), &checksum_entry),
            ],
        )?;

        info!(
            target: PIPELINE_TARGET,
            output = %output_path.display(),
            plugin = %metadata.id,
            "package created"
        );
        Ok(PackageReport {
            output_path: output_path.to_path_buf(),
            checksum,
            metadata,
        })
    }

    fn run_step(&self, stage: Stage, invocation: &Invocation) -> Result<Vec<String>, PackError> {
        let output = self.runner.run(invocation.program(), invocation.args())?;
        if output.success() {
            return Ok(output.stdout().to_vec());
        }
        Err(PackError::CommandFailed {
            stage,
            status: output.status(),
            diagnostics: output.diagnostics(),
        })
    }
}
