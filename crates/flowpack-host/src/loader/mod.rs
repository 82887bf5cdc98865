//! Abstractions over the platform dynamic loader.
//!
//! Sessions depend on [`ModuleLoader`] rather than on `libloading` directly
//! so the unload protocol can be exercised without building real modules.

mod native;

use std::path::Path;

use flowpack_plugin_api::PluginDescriptor;

use crate::error::HostError;

pub use self::native::{NativeLoader, NativeModule};

/// Opens plugin modules and reports whether they are still mapped.
pub trait ModuleLoader {
    /// Module handle produced by this loader.
    type Module: PluginModule;

    /// Loads the module at `path` into a fresh, independently releasable
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::LoadFailed`] when the loader rejects the module.
    fn load(&self, path: &Path) -> Result<Self::Module, HostError>;

    /// Returns `true` while the module at `path` remains mapped in the
    /// process.
    fn is_resident(&self, path: &Path) -> bool;
}

/// A loaded plugin module.
pub trait PluginModule {
    /// Resolves the module's plugin descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::CapabilityMissing`] when the module does not
    /// export a descriptor.
    fn descriptor(&self) -> Result<&PluginDescriptor, HostError>;

    /// Releases the module context.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::CloseFailed`] when the loader reports a failure.
    fn close(self) -> Result<(), HostError>;
}
