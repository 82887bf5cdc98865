//! Zip archive writing for plugin artifacts and final packages.

use std::fs::File;
use std::io;
use std::path::{Component, Path};

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PackError;

/// Tracing target for archive operations.
const ARCHIVE_TARGET: &str = "flowpack::archive";

/// A file to place in a package under a chosen entry name.
#[derive(Debug, Clone, Copy)]
pub struct PackageEntry<'a> {
    source: &'a Path,
    name: &'a str,
}

impl<'a> PackageEntry<'a> {
    /// Stores the file at `source` as `name`.
    #[must_use]
    pub const fn new(source: &'a Path, name: &'a str) -> Self {
        Self { source, name }
    }
}

fn options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Recursively archives the contents of `source_dir` into a new zip file at
/// `destination`.
///
/// Entry names are relative to `source_dir` and use `/` separators. Entries
/// are written in file-name order so identical trees yield identical entry
/// lists. Returns the number of files archived.
///
/// # Errors
///
/// Returns a [`PackError`] when the tree cannot be walked or the archive
/// cannot be written.
pub fn zip_directory(source_dir: &Path, destination: &Path) -> Result<usize, PackError> {
    let file = File::create(destination).map_err(|error| PackError::io(destination, error))?;
    let mut writer = ZipWriter::new(file);
    let mut files = 0_usize;

    for item in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = item.map_err(|error| {
            let path = error.path().unwrap_or(source_dir).to_path_buf();
            PackError::io(path, io::Error::from(error))
        })?;
        let name = entry_name(source_dir, entry.path())?;
        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options())
                .map_err(|error| PackError::archive(destination, error))?;
            continue;
        }
        writer
            .start_file(name, options())
            .map_err(|error| PackError::archive(destination, error))?;
        let mut input = File::open(entry.path()).map_err(|error| PackError::io(entry.path(), error))?;
        io::copy(&mut input, &mut writer).map_err(|error| PackError::io(entry.path(), error))?;
        files += 1;
    }

    writer
        .finish()
        .map_err(|error| PackError::archive(destination, error))?;
    debug!(
        target: ARCHIVE_TARGET,
        source = %source_dir.display(),
        archive = %destination.display(),
        files,
        "directory archived"
    );
    Ok(files)
}

/// Writes a zip containing exactly `entries` to `destination`.
///
/// The archive is assembled in a temporary file beside `destination` and
/// moved over it only once complete, replacing any existing file. A failure
/// leaves `destination` untouched.
///
/// # Errors
///
/// Returns a [`PackError`] when an entry cannot be read or the archive cannot
/// be written or moved into place.
pub fn write_package(destination: &Path, entries: &[PackageEntry<'_>]) -> Result<(), PackError> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staging =
        NamedTempFile::new_in(parent).map_err(|error| PackError::io(parent, error))?;

    {
        let mut writer = ZipWriter::new(staging.as_file_mut());
        for entry in entries {
            writer
                .start_file(entry.name, options())
                .map_err(|error| PackError::archive(destination, error))?;
            let mut input =
                File::open(entry.source).map_err(|error| PackError::io(entry.source, error))?;
            io::copy(&mut input, &mut writer).map_err(|error| PackError::io(entry.source, error))?;
        }
        writer
            .finish()
            .map_err(|error| PackError::archive(destination, error))?;
    }

    staging
        .persist(destination)
        .map_err(|error| PackError::io(destination, error.error))?;
    debug!(
        target: ARCHIVE_TARGET,
        archive = %destination.display(),
        entries = entries.len(),
        "package written"
    );
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String, PackError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        PackError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path escapes the archive root"),
        )
    })?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_string_lossy().into_owned());
        }
    }
    Ok(parts.join("/"))
}
