//! Layered configuration for the FlowPack packager.
//!
//! Values resolve from built-in defaults, configuration files, `FLOWPACK_*`
//! environment variables and leading command-line flags, in increasing order
//! of precedence. The cargo program and build profile carry built-in defaults
//! in the defaults layer, so the merged configuration is never empty; the
//! remaining fields are optional and their accessors supply fallbacks.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BUILD_PROFILE, DEFAULT_CARGO, DEFAULT_LOG_FILTER, VERBOSE_LOG_FILTER,
    default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved FlowPack configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FLOWPACK")]
pub struct Config {
    /// Program used to invoke cargo.
    #[ortho_config(default = String::from(DEFAULT_CARGO))]
    pub cargo_path: Option<String>,
    /// Cargo profile used for the build and publish steps.
    #[ortho_config(default = String::from(DEFAULT_BUILD_PROFILE))]
    pub build_profile: Option<String>,
    /// Cargo target directory override.
    pub target_dir: Option<Utf8PathBuf>,
    /// Tracing filter expression.
    pub log_filter: Option<String>,
    /// Tracing output format.
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Program used to invoke cargo.
    #[must_use]
    pub fn cargo_path(&self) -> &str {
        self.cargo_path.as_deref().unwrap_or(DEFAULT_CARGO)
    }

    /// Cargo profile used for the build and publish steps.
    #[must_use]
    pub fn build_profile(&self) -> &str {
        self.build_profile.as_deref().unwrap_or(DEFAULT_BUILD_PROFILE)
    }

    /// Cargo target directory override, when configured.
    #[must_use]
    pub fn target_dir(&self) -> Option<&Utf8Path> {
        self.target_dir.as_deref()
    }

    /// Tracing filter expression.
    ///
    /// An explicitly configured filter always wins; otherwise `verbose`
    /// selects [`VERBOSE_LOG_FILTER`] over [`DEFAULT_LOG_FILTER`].
    #[must_use]
    pub fn log_filter(&self, verbose: bool) -> &str {
        match self.log_filter.as_deref() {
            Some(filter) => filter,
            None if verbose => VERBOSE_LOG_FILTER,
            None => default_log_filter(),
        }
    }

    /// Tracing output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }
}
