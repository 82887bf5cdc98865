//! Transient plugin hosting for FlowPack.
//!
//! Freshly built plugin modules are loaded just long enough to read their
//! self-declared metadata and are released again before the packager touches
//! the files. Every candidate module gets its own [`LoadSession`]; sessions
//! never share a module context and always unload on drop.
//!
//! Release is confirmed with a bounded number of checks
//! ([`UNLOAD_ATTEMPTS`]). A module that stays mapped after the last check is
//! logged and otherwise ignored, since the metadata has already been copied
//! into an owned [`PluginMetadata`].

mod discovery;
mod error;
mod loader;
mod metadata;
mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use discovery::discover_metadata;
pub use error::{HostError, MetadataError};
pub use loader::{ModuleLoader, NativeLoader, NativeModule, PluginModule};
pub use metadata::PluginMetadata;
pub use session::{
    DEFAULT_POLL_INTERVAL, HostOptions, LoadSession, PluginInstance, UNLOAD_ATTEMPTS,
    UnloadOutcome,
};

/// Tracing target for host operations.
pub const HOST_TARGET: &str = "flowpack::host";
