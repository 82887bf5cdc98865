//! Projection of plugin metadata into `manifest.json`.

use std::fs;
use std::path::{Path, PathBuf};

use flowpack_host::PluginMetadata;

use crate::error::PackError;

/// File name of the manifest, both on disk and inside the package.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Serialises `metadata` as indented JSON.
///
/// Field names follow the manifest schema, `authors` and `tags` keep their
/// declared order, and absent optional fields are written as `null`.
///
/// # Errors
///
/// Returns [`PackError::SerializeManifest`] when serialisation fails.
pub fn project(metadata: &PluginMetadata) -> Result<Vec<u8>, PackError> {
    serde_json::to_vec_pretty(metadata).map_err(PackError::SerializeManifest)
}

/// Writes the manifest for `metadata` into `directory`, replacing any
/// existing file, and returns its path.
///
/// # Errors
///
/// Returns a [`PackError`] when serialisation or the write fails.
pub fn save(metadata: &PluginMetadata, directory: &Path) -> Result<PathBuf, PackError> {
    let bytes = project(metadata)?;
    let path = directory.join(MANIFEST_FILE_NAME);
    fs::write(&path, bytes).map_err(|error| PackError::io(&path, error))?;
    Ok(path)
}

/// Reads a manifest back from `path`.
///
/// # Errors
///
/// Returns a [`PackError`] when the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<PluginMetadata, PackError> {
    let bytes = fs::read(path).map_err(|error| PackError::io(path, error))?;
    serde_json::from_slice(&bytes).map_err(|source| PackError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests;
