//! Domain errors raised while hosting plugin modules.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::str::Utf8Error;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from loading, querying or releasing a plugin module.
#[derive(Debug, Error)]
pub enum HostError {
    /// The module path does not reference an existing file.
    #[error("plugin module not found: {path}")]
    ModuleNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The dynamic loader rejected the module.
    #[error("failed to load plugin module {path}: {message}")]
    LoadFailed {
        /// Module path.
        path: PathBuf,
        /// Loader diagnostic.
        message: String,
    },

    /// The module does not expose the plugin capability.
    #[error("{path} does not export a FlowPack plugin: {message}")]
    CapabilityMissing {
        /// Module path.
        path: PathBuf,
        /// Description of the missing capability.
        message: String,
    },

    /// The module was built against an incompatible plugin ABI.
    #[error("{path} targets plugin ABI {found}, expected {expected}")]
    AbiMismatch {
        /// Module path.
        path: PathBuf,
        /// ABI version understood by the host.
        expected: u32,
        /// ABI version reported by the module.
        found: u32,
    },

    /// The module failed to produce a plugin instance.
    #[error("{path} failed to instantiate its plugin")]
    InstantiationFailed {
        /// Module path.
        path: PathBuf,
    },

    /// The plugin reported metadata that could not be copied out.
    #[error("{path} reported invalid metadata: {source}")]
    InvalidMetadata {
        /// Module path.
        path: PathBuf,
        /// Underlying metadata failure.
        #[source]
        source: MetadataError,
    },

    /// The plugin was requested before the module was loaded.
    #[error("plugin module {path} has not been loaded")]
    NotLoaded {
        /// Module path.
        path: PathBuf,
    },

    /// The plugin was requested after the session released the module.
    #[error("plugin module {path} has been unloaded")]
    Unloaded {
        /// Module path.
        path: PathBuf,
    },

    /// The dynamic loader failed to release the module.
    #[error("failed to release plugin module {path}: {message}")]
    CloseFailed {
        /// Module path.
        path: PathBuf,
        /// Loader diagnostic.
        message: String,
    },

    /// A directory of candidate modules could not be enumerated.
    #[error("failed to scan {path} for plugin modules: {source}")]
    ScanDirectory {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Failures encountered while copying plugin metadata out of a module.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The plugin returned no metadata at all.
    #[error("plugin returned no metadata")]
    Missing,

    /// A required field was absent.
    #[error("required field '{field}' is missing")]
    MissingField {
        /// Field name in the manifest schema.
        field: &'static str,
    },

    /// A field held bytes that are not valid UTF-8.
    #[error("field '{field}' is not valid UTF-8")]
    InvalidText {
        /// Field name in the manifest schema.
        field: &'static str,
        /// Underlying decoding error.
        #[source]
        source: Utf8Error,
    },
}
