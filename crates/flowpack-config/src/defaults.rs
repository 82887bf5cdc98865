use crate::logging::LogFormat;

/// Program invoked to drive cargo when none is configured.
pub const DEFAULT_CARGO: &str = "cargo";

/// Cargo profile used for plugin builds.
pub const DEFAULT_BUILD_PROFILE: &str = "release";

/// Log filter used when neither configuration nor `--verbose` selects one.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log filter selected by `--verbose` unless configuration overrides it.
pub const VERBOSE_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
