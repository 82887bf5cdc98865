//! `libloading`-backed module loader.

use std::path::{Path, PathBuf};

use flowpack_plugin_api::{DESCRIPTOR_SYMBOL, DescriptorFn, PluginDescriptor};
use libloading::{Library, Symbol};
use tracing::debug;

use super::{ModuleLoader, PluginModule};
use crate::HOST_TARGET;
use crate::error::HostError;

/// Loads plugin modules through the operating system's dynamic loader.
///
/// On Unix every load opens the module with `RTLD_NOW | RTLD_LOCAL` so its
/// symbols never leak into the global namespace of the host process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

/// A module opened by [`NativeLoader`].
#[derive(Debug)]
pub struct NativeModule {
    path: PathBuf,
    library: Library,
}

impl ModuleLoader for NativeLoader {
    type Module = NativeModule;

    fn load(&self, path: &Path) -> Result<Self::Module, HostError> {
        let library = open_isolated(path).map_err(|error| HostError::LoadFailed {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        debug!(target: HOST_TARGET, module = %path.display(), "module mapped");
        Ok(NativeModule {
            path: path.to_path_buf(),
            library,
        })
    }

    fn is_resident(&self, path: &Path) -> bool {
        probe_resident(path)
    }
}

impl PluginModule for NativeModule {
    fn descriptor(&self) -> Result<&PluginDescriptor, HostError> {
        // SAFETY: the symbol is declared by the plugin ABI with exactly this
        // signature, and the returned pointer references a static inside the
        // module, which outlives `&self`.
        unsafe {
            let accessor: Symbol<'_, DescriptorFn> = self
                .library
                .get(DESCRIPTOR_SYMBOL.as_bytes())
                .map_err(|error| self.capability_missing(error.to_string()))?;
            accessor()
                .as_ref()
                .ok_or_else(|| self.capability_missing(String::from("descriptor accessor returned null")))
        }
    }

    fn close(self) -> Result<(), HostError> {
        self.library.close().map_err(|error| HostError::CloseFailed {
            path: self.path,
            message: error.to_string(),
        })
    }
}

impl NativeModule {
    fn capability_missing(&self, message: String) -> HostError {
        HostError::CapabilityMissing {
            path: self.path.clone(),
            message,
        }
    }
}

#[cfg(unix)]
fn open_isolated(path: &Path) -> Result<Library, libloading::Error> {
    use libloading::os::unix::Library as UnixLibrary;

    let flags = libc::RTLD_NOW | libc::RTLD_LOCAL;
    // SAFETY: module initialisers run on load; plugin modules are trusted to
    // the same degree as the build that produced them.
    unsafe { UnixLibrary::open(Some(path), flags) }.map(Library::from)
}

#[cfg(windows)]
fn open_isolated(path: &Path) -> Result<Library, libloading::Error> {
    // SAFETY: see the Unix variant.
    unsafe { Library::new(path) }
}

#[cfg(unix)]
fn probe_resident(path: &Path) -> bool {
    use libloading::os::unix::Library as UnixLibrary;

    // RTLD_NOLOAD only succeeds for objects that are already mapped, and the
    // extra reference it takes is dropped again straight away.
    let flags = libc::RTLD_NOW | libc::RTLD_LOCAL | libc::RTLD_NOLOAD;
    // SAFETY: RTLD_NOLOAD never maps the object, so no initialiser runs.
    match unsafe { UnixLibrary::open(Some(path), flags) } {
        Ok(probe) => {
            drop(probe.close());
            true
        }
        Err(_) => false,
    }
}

#[cfg(windows)]
fn probe_resident(path: &Path) -> bool {
    use libloading::os::windows::Library as WindowsLibrary;

    WindowsLibrary::open_already_loaded(path).is_ok_and(|probe| {
        drop(probe.close());
        true
    })
}
