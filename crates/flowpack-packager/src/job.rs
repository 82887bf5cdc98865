//! Temporary state owned by one packaging run.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use crate::PIPELINE_TARGET;
use crate::checksum::CHECKSUM_EXTENSION;
use crate::error::PackError;

/// Extension of the intermediate plugin artifact.
pub const PLUGIN_EXTENSION: &str = "plugin";

/// Exclusively owned temporary locations of a packaging run.
///
/// Everything lives under one uniquely named root directory, which is removed
/// recursively by [`Self::finish`] or, on any early exit, by `Drop`. Removal
/// failures are logged and never reported as errors.
#[derive(Debug)]
pub struct PackagingJob {
    root: Option<TempDir>,
    publish_dir: PathBuf,
    manifest_dir: PathBuf,
    artifact_path: PathBuf,
    checksum_path: PathBuf,
}

impl PackagingJob {
    /// Creates the job's temporary locations under `scratch_dir`, or the
    /// system temporary directory when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] when a directory cannot be created.
    pub fn create(scratch_dir: Option<&Path>, project_name: &str) -> Result<Self, PackError> {
        let parent = scratch_dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let root = Builder::new()
            .prefix("flowpack-")
            .tempdir_in(&parent)
            .map_err(|error| PackError::io(&parent, error))?;

        let publish_dir = root.path().join("publish");
        let manifest_dir = root.path().join("manifest");
        for directory in [&publish_dir, &manifest_dir] {
            fs::create_dir(directory).map_err(|error| PackError::io(directory, error))?;
        }
        let artifact_path = root
            .path()
            .join(format!("{project_name}.{PLUGIN_EXTENSION}"));
        let checksum_path = root
            .path()
            .join(format!("{project_name}.{PLUGIN_EXTENSION}.{CHECKSUM_EXTENSION}"));

        debug!(target: PIPELINE_TARGET, root = %root.path().display(), "job directory created");
        Ok(Self {
            root: Some(root),
            publish_dir,
            manifest_dir,
            artifact_path,
            checksum_path,
        })
    }

    /// Directory receiving the published build output.
    #[must_use]
    pub fn publish_dir(&self) -> &Path {
        &self.publish_dir
    }

    /// Directory receiving `manifest.json`, kept apart from the publish
    /// directory.
    #[must_use]
    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// Path of the zipped plugin artifact.
    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Path of the artifact's checksum file.
    #[must_use]
    pub fn checksum_path(&self) -> &Path {
        &self.checksum_path
    }

    /// Removes every temporary location now.
    pub fn finish(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let path = root.path().to_path_buf();
        match root.close() {
            Ok(()) => debug!(target: PIPELINE_TARGET, root = %path.display(), "job directory removed"),
            Err(error) => warn!(
                target: PIPELINE_TARGET,
                root = %path.display(),
                %error,
                "failed to remove job directory"
            ),
        }
    }
}

impl Drop for PackagingJob {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn locations_live_under_one_root() {
        let scratch = TempDir::new().expect("create scratch dir");
        let job = PackagingJob::create(Some(scratch.path()), "sample").expect("create job");

        assert!(job.publish_dir().is_dir());
        assert!(job.manifest_dir().is_dir());
        assert_ne!(job.publish_dir(), job.manifest_dir());
        assert!(job.artifact_path().ends_with("sample.plugin"));
        assert!(job.checksum_path().ends_with("sample.plugin.sha256"));
        assert_eq!(job.artifact_path().parent(), job.checksum_path().parent());
    }

    #[rstest]
    fn finish_removes_everything() {
        let scratch = TempDir::new().expect("create scratch dir");
        let job = PackagingJob::create(Some(scratch.path()), "sample").expect("create job");
        fs::write(job.publish_dir().join("libsample.so"), b"x").expect("write file");

        job.finish();

        let remaining = fs::read_dir(scratch.path()).expect("list scratch").count();
        assert_eq!(remaining, 0);
    }

    #[rstest]
    fn drop_removes_everything() {
        let scratch = TempDir::new().expect("create scratch dir");
        {
            let job = PackagingJob::create(Some(scratch.path()), "sample").expect("create job");
            fs::write(job.artifact_path(), b"x").expect("write artifact");
        }
        let remaining = fs::read_dir(scratch.path()).expect("list scratch").count();
        assert_eq!(remaining, 0);
    }

    #[rstest]
    fn concurrent_jobs_never_share_locations() {
        let scratch = TempDir::new().expect("create scratch dir");
        let first = PackagingJob::create(Some(scratch.path()), "sample").expect("create job");
        let second = PackagingJob::create(Some(scratch.path()), "sample").expect("create job");
        assert_ne!(first.publish_dir(), second.publish_dir());
    }
}
