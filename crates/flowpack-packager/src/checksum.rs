//! SHA-256 checksums of plugin artifacts.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::PackError;

/// Extension appended to an artifact's file name for its checksum file.
pub const CHECKSUM_EXTENSION: &str = "sha256";

/// Returns the lowercase hexadecimal SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`PackError::Io`] when the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String, PackError> {
    let mut file = File::open(path).map_err(|error| PackError::io(path, error))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|error| PackError::io(path, error))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hashes `artifact` and writes the digest, as a single line without a
/// trailing newline, to `checksum_path`. Returns the digest.
///
/// # Errors
///
/// Returns [`PackError::Io`] when the artifact cannot be read or the checksum
/// cannot be written.
pub fn write_checksum(artifact: &Path, checksum_path: &Path) -> Result<String, PackError> {
    let digest = sha256_file(artifact)?;
    fs::write(checksum_path, &digest).map_err(|error| PackError::io(checksum_path, error))?;
    Ok(digest)
}
