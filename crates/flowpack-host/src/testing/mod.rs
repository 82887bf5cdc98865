//! In-memory module loader and sample plugins for tests.
//!
//! [`FakeLoader`] maps file names to descriptors compiled into the test
//! binary, so the full load, instantiate, read and release protocol runs
//! without building a real `cdylib`. Module files must still exist on disk
//! because sessions check for them before loading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use flowpack_plugin_api::{Plugin, PluginDescriptor, PluginInfo};

use crate::error::HostError;
use crate::loader::{ModuleLoader, PluginModule};

/// Fully described plugin used across test suites.
#[derive(Debug, Default)]
pub struct SamplePlugin;

impl Plugin for SamplePlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            description: Some(String::from("Reads and writes CSV records")),
            license: Some(String::from("MIT")),
            license_url: Some(String::from("https://example.com/license")),
            project_url: Some(String::from("https://example.com/csv")),
            authors: vec![String::from("Zoe"), String::from("Adam")],
            tags: vec![String::from("csv"), String::from("io"), String::from("data")],
            ..PluginInfo::new("acme.csv", "Connector", "1.2.3", "Acme", "Data", "1.0.0")
        }
    }
}

/// Plugin with only the required fields populated.
#[derive(Debug, Default)]
pub struct MinimalPlugin;

impl Plugin for MinimalPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo::new("acme.minimal", "Transform", "0.1.0", "Acme", "Misc", "1.0.0")
    }
}

/// Plugin whose construction panics.
#[derive(Debug)]
pub struct PanickingPlugin;

impl Default for PanickingPlugin {
    fn default() -> Self {
        panic!("plugin constructor failed");
    }
}

impl Plugin for PanickingPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo::default()
    }
}

/// Descriptor for [`SamplePlugin`].
pub static SAMPLE: PluginDescriptor = PluginDescriptor::for_plugin::<SamplePlugin>();

/// Descriptor for [`MinimalPlugin`].
pub static MINIMAL: PluginDescriptor = PluginDescriptor::for_plugin::<MinimalPlugin>();

/// Descriptor for [`PanickingPlugin`].
pub static PANICKING: PluginDescriptor = PluginDescriptor::for_plugin::<PanickingPlugin>();

/// [`SamplePlugin`] advertised under a future ABI version.
pub static FUTURE_ABI: PluginDescriptor = PluginDescriptor {
    abi_version: flowpack_plugin_api::ABI_VERSION + 1,
    ..PluginDescriptor::for_plugin::<SamplePlugin>()
};

/// Behaviour of a module file known to [`FakeLoader`].
#[derive(Debug, Clone, Copy)]
pub enum FakeModule {
    /// Loads and exposes the descriptor.
    Plugin(&'static PluginDescriptor),
    /// Loads but exports no descriptor.
    NoCapability,
    /// Fails to load.
    Corrupt,
}

#[derive(Debug, Default)]
struct LoaderState {
    resident: HashMap<PathBuf, usize>,
    loads: Vec<PathBuf>,
    closes: usize,
}

/// Loader resolving modules from an in-memory table keyed by file name.
#[derive(Debug, Default)]
pub struct FakeLoader {
    modules: HashMap<OsString, FakeModule>,
    sticky: bool,
    state: Rc<RefCell<LoaderState>>,
}

impl FakeLoader {
    /// Creates a loader that knows no modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the behaviour for module files named `file_name`.
    #[must_use]
    pub fn with_module(mut self, file_name: &str, module: FakeModule) -> Self {
        self.modules.insert(OsString::from(file_name), module);
        self
    }

    /// Keeps modules resident after they are closed.
    #[must_use]
    pub const fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    /// Paths passed to [`ModuleLoader::load`], in call order.
    #[must_use]
    pub fn loads(&self) -> Vec<PathBuf> {
        self.state.borrow().loads.clone()
    }

    /// Number of module handles closed so far.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.state.borrow().closes
    }

    /// Number of modules currently resident.
    #[must_use]
    pub fn resident(&self) -> usize {
        self.state.borrow().resident.values().sum()
    }
}

/// Handle produced by [`FakeLoader`].
#[derive(Debug)]
pub struct FakeHandle {
    path: PathBuf,
    module: FakeModule,
    sticky: bool,
    state: Rc<RefCell<LoaderState>>,
}

impl ModuleLoader for FakeLoader {
    type Module = FakeHandle;

    fn load(&self, path: &Path) -> Result<Self::Module, HostError> {
        let module = path
            .file_name()
            .and_then(|name| self.modules.get(name))
            .copied()
            .unwrap_or(FakeModule::Corrupt);
        let mut state = self.state.borrow_mut();
        state.loads.push(path.to_path_buf());
        if matches!(module, FakeModule::Corrupt) {
            return Err(HostError::LoadFailed {
                path: path.to_path_buf(),
                message: String::from("invalid ELF header"),
            });
        }
        *state.resident.entry(path.to_path_buf()).or_default() += 1;
        Ok(FakeHandle {
            path: path.to_path_buf(),
            module,
            sticky: self.sticky,
            state: Rc::clone(&self.state),
        })
    }

    fn is_resident(&self, path: &Path) -> bool {
        self.state
            .borrow()
            .resident
            .get(path)
            .is_some_and(|count| *count > 0)
    }
}

impl PluginModule for FakeHandle {
    fn descriptor(&self) -> Result<&PluginDescriptor, HostError> {
        match self.module {
            FakeModule::Plugin(descriptor) => Ok(descriptor),
            FakeModule::NoCapability | FakeModule::Corrupt => Err(HostError::CapabilityMissing {
                path: self.path.clone(),
                message: String::from("undefined symbol: flowpack_plugin_descriptor"),
            }),
        }
    }

    fn close(self) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        if !self.sticky {
            if let Some(count) = state.resident.get_mut(&self.path) {
                *count = count.saturating_sub(1);
            }
        }
        Ok(())
    }
}

/// Creates an empty file named `file_name` inside `directory`.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be written.
pub fn touch_module(directory: &Path, file_name: &str) -> std::io::Result<PathBuf> {
    let path = directory.join(file_name);
    std::fs::write(&path, b"")?;
    Ok(path)
}

/// File name carrying the platform's loadable-module extension.
#[must_use]
pub fn module_file_name(stem: &str) -> String {
    format!("{stem}.{}", std::env::consts::DLL_EXTENSION)
}
