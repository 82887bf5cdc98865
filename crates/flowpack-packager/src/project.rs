//! Pre-flight validation of the project and output paths.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PackError;

/// File name every packable project must point at.
pub const PROJECT_FILE_NAME: &str = "Cargo.toml";

/// Extension of the final package archive, without the leading dot.
pub const PACKAGE_EXTENSION: &str = "fspack";

/// A validated cargo project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    manifest_path: PathBuf,
    name: String,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<PackageSection>,
}

#[derive(Deserialize)]
struct PackageSection {
    name: String,
}

impl Project {
    /// Validates `path` and reads the package name from it.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::ProjectNotFound`] when the file does not exist,
    /// [`PackError::NotAProjectFile`] when it is not named `Cargo.toml`, and a
    /// parse error when it declares no package name.
    pub fn locate(path: &Path) -> Result<Self, PackError> {
        if !path.is_file() {
            return Err(PackError::ProjectNotFound {
                path: path.to_path_buf(),
            });
        }
        if path.file_name().and_then(|name| name.to_str()) != Some(PROJECT_FILE_NAME) {
            return Err(PackError::NotAProjectFile {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|error| PackError::io(path, error))?;
        let manifest: CargoManifest =
            toml::from_str(&contents).map_err(|error| PackError::ParseProject {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
        let name = manifest
            .package
            .map(|package| package.name)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| PackError::MissingPackageName {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            manifest_path: path.to_path_buf(),
            name,
        })
    }

    /// Path to the project's `Cargo.toml`.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Package name declared by the project.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves where the final archive is written.
    ///
    /// A requested path is used verbatim; otherwise the archive is named after
    /// the project inside `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidOutputExtension`] when `requested` does not
    /// end in `.fspack`.
    pub fn output_path(
        &self,
        requested: Option<&Path>,
        working_dir: &Path,
    ) -> Result<PathBuf, PackError> {
        match requested {
            Some(path) => {
                validate_output_path(path)?;
                Ok(path.to_path_buf())
            }
            None => Ok(working_dir.join(format!("{}.{PACKAGE_EXTENSION}", self.name))),
        }
    }
}

/// Checks that `path` carries the package extension, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`PackError::InvalidOutputExtension`] otherwise.
pub fn validate_output_path(path: &Path) -> Result<(), PackError> {
    let valid = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(PACKAGE_EXTENSION));
    if valid {
        Ok(())
    } else {
        Err(PackError::InvalidOutputExtension {
            path: path.to_path_buf(),
        })
    }
}
