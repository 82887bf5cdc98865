//! Directory scan for the first module exposing a plugin.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::HOST_TARGET;
use crate::error::HostError;
use crate::loader::ModuleLoader;
use crate::metadata::PluginMetadata;
use crate::session::{HostOptions, LoadSession};

/// Returns the metadata of the first module in `directory` that exposes a
/// plugin.
///
/// Candidates are regular files carrying the platform's loadable-module
/// extension, visited in file-name order. Each candidate gets its own
/// [`LoadSession`], which is unloaded before the next candidate is tried.
/// Per-candidate failures are logged when `options.verbose()` is set and
/// otherwise skipped silently. `Ok(None)` means no candidate qualified.
///
/// # Errors
///
/// Returns [`HostError::ScanDirectory`] when `directory` cannot be read.
pub fn discover_metadata<L: ModuleLoader>(
    loader: &L,
    directory: &Path,
    options: HostOptions,
) -> Result<Option<PluginMetadata>, HostError> {
    let candidates = module_candidates(directory)?;
    debug!(
        target: HOST_TARGET,
        directory = %directory.display(),
        candidates = candidates.len(),
        "scanning for plugin modules"
    );

    for candidate in &candidates {
        match extract(loader, candidate, options) {
            Ok(metadata) => {
                info!(
                    target: HOST_TARGET,
                    module = %candidate.display(),
                    plugin = %metadata.id,
                    version = %metadata.version,
                    "plugin metadata discovered"
                );
                return Ok(Some(metadata));
            }
            Err(error) => {
                if options.verbose() {
                    warn!(
                        target: HOST_TARGET,
                        module = %candidate.display(),
                        %error,
                        "skipping candidate module"
                    );
                }
            }
        }
    }
    Ok(None)
}

fn extract<L: ModuleLoader>(
    loader: &L,
    candidate: &Path,
    options: HostOptions,
) -> Result<PluginMetadata, HostError> {
    let mut session = LoadSession::open(loader, candidate, options)?;
    let extracted = session.load().and_then(|plugin| plugin.metadata());
    let outcome = session.unload();
    debug!(target: HOST_TARGET, module = %candidate.display(), ?outcome, "session closed");
    extracted
}

fn module_candidates(directory: &Path) -> Result<Vec<PathBuf>, HostError> {
    let scan_error = |source: std::io::Error| HostError::ScanDirectory {
        path: directory.to_path_buf(),
        source: Arc::new(source),
    };
    let mut candidates = Vec::new();
    for item in fs::read_dir(directory).map_err(scan_error)? {
        let entry = item.map_err(scan_error)?;
        let path = entry.path();
        if path.is_file() && has_module_extension(&path) {
            candidates.push(path);
        }
    }
    candidates.sort_by(|left, right| left.file_name().cmp(&right.file_name()));
    Ok(candidates)
}

fn has_module_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(std::env::consts::DLL_EXTENSION))
}
