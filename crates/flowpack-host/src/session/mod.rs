//! Single-module load sessions and the bounded unload protocol.
//!
//! A [`LoadSession`] exclusively owns one module context. The plugin instance
//! it creates holds the only other strong reference to that context, so
//! destroying the instance and dropping the session's handle leaves the
//! context unreachable. Release is then confirmed by polling a weak
//! observation handle together with the loader's residency probe.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use flowpack_plugin_api::{ABI_VERSION, RawPluginMetadata};
use tracing::{debug, warn};

use crate::HOST_TARGET;
use crate::error::{HostError, MetadataError};
use crate::loader::{ModuleLoader, PluginModule};
use crate::metadata::PluginMetadata;

/// Maximum number of release checks performed by [`LoadSession::unload`].
pub const UNLOAD_ATTEMPTS: usize = 10;

/// Pause between release checks unless overridden.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Explicit host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOptions {
    verbose: bool,
    poll_interval: Duration,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl HostOptions {
    /// Enables logging of per-candidate discovery failures.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the pause between release checks.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Whether per-candidate discovery failures are logged.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Pause between release checks.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Result of [`LoadSession::unload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadOutcome {
    /// The context was confirmed released on the given check.
    Released {
        /// One-based index of the check that observed the release.
        attempts: usize,
    },
    /// The context was still observable after [`UNLOAD_ATTEMPTS`] checks.
    Lingering,
    /// Nothing was loaded, so there was nothing to release.
    NotLoaded,
    /// The session had already been unloaded.
    AlreadyUnloaded,
}

/// An isolated context scoped to exactly one module file.
pub struct LoadSession<'l, L: ModuleLoader> {
    loader: &'l L,
    path: PathBuf,
    options: HostOptions,
    context: Option<Arc<L::Module>>,
    plugin: Option<PluginInstance<L::Module>>,
    unloaded: bool,
}

impl<'l, L: ModuleLoader> LoadSession<'l, L> {
    /// Opens a session for the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ModuleNotFound`] before any load is attempted when
    /// `path` is not an existing file.
    pub fn open(loader: &'l L, path: &Path, options: HostOptions) -> Result<Self, HostError> {
        if !path.is_file() {
            return Err(HostError::ModuleNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            loader,
            path: path.to_path_buf(),
            options,
            context: None,
            plugin: None,
            unloaded: false,
        })
    }

    /// Module path this session is scoped to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the module and instantiates its plugin.
    ///
    /// Calling `load` again on a loaded session returns the existing
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] when the module cannot be loaded, lacks the
    /// plugin capability, targets another ABI, fails to instantiate, or the
    /// session has been unloaded.
    pub fn load(&mut self) -> Result<&PluginInstance<L::Module>, HostError> {
        if self.unloaded {
            return Err(HostError::Unloaded {
                path: self.path.clone(),
            });
        }
        if self.plugin.is_none() {
            let context = match &self.context {
                Some(context) => Arc::clone(context),
                None => {
                    let module = Arc::new(self.loader.load(&self.path)?);
                    self.context = Some(Arc::clone(&module));
                    module
                }
            };
            let instance = PluginInstance::create(&self.path, context)?;
            debug!(target: HOST_TARGET, module = %self.path.display(), "plugin instantiated");
            self.plugin = Some(instance);
        }
        self.plugin()
    }

    /// Returns the live plugin instance.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Unloaded`] once the session has been unloaded and
    /// [`HostError::NotLoaded`] before a successful [`Self::load`].
    pub fn plugin(&self) -> Result<&PluginInstance<L::Module>, HostError> {
        if self.unloaded {
            return Err(HostError::Unloaded {
                path: self.path.clone(),
            });
        }
        self.plugin.as_ref().ok_or_else(|| HostError::NotLoaded {
            path: self.path.clone(),
        })
    }

    /// Releases the plugin and its module context.
    ///
    /// Failing to confirm the release within [`UNLOAD_ATTEMPTS`] checks is
    /// logged and reported as [`UnloadOutcome::Lingering`], never as an
    /// error. Subsequent calls are no-ops.
    pub fn unload(&mut self) -> UnloadOutcome {
        if self.unloaded {
            return UnloadOutcome::AlreadyUnloaded;
        }
        self.unloaded = true;

        drop(self.plugin.take());
        let Some(context) = self.context.take() else {
            return UnloadOutcome::NotLoaded;
        };

        let observer = Arc::downgrade(&context);
        match Arc::try_unwrap(context) {
            Ok(module) => {
                if let Err(error) = module.close() {
                    warn!(target: HOST_TARGET, %error, "module close reported a failure");
                }
            }
            Err(shared) => drop(shared),
        }

        match self.confirm_release(&observer) {
            Some(attempts) => {
                debug!(
                    target: HOST_TARGET,
                    module = %self.path.display(),
                    attempts,
                    "module context released"
                );
                UnloadOutcome::Released { attempts }
            }
            None => {
                debug!(
                    target: HOST_TARGET,
                    module = %self.path.display(),
                    attempts = UNLOAD_ATTEMPTS,
                    "module context still observable; giving up"
                );
                UnloadOutcome::Lingering
            }
        }
    }

    fn confirm_release(&self, observer: &Weak<L::Module>) -> Option<usize> {
        for attempt in 1..=UNLOAD_ATTEMPTS {
            if observer.strong_count() == 0 && !self.loader.is_resident(&self.path) {
                return Some(attempt);
            }
            if attempt < UNLOAD_ATTEMPTS {
                thread::sleep(self.options.poll_interval);
            }
        }
        None
    }
}

impl<L: ModuleLoader> Drop for LoadSession<'_, L> {
    fn drop(&mut self) {
        self.unload();
    }
}

/// A live plugin instance created inside a [`LoadSession`].
///
/// The instance keeps its module context alive and destroys itself through
/// the module's descriptor when dropped.
pub struct PluginInstance<M> {
    path: PathBuf,
    instance: NonNull<c_void>,
    metadata: unsafe extern "C" fn(*const c_void) -> *const RawPluginMetadata,
    destroy: unsafe extern "C" fn(*mut c_void),
    _context: Arc<M>,
}

impl<M: PluginModule> PluginInstance<M> {
    fn create(path: &Path, context: Arc<M>) -> Result<Self, HostError> {
        let descriptor = context.descriptor()?;
        if descriptor.abi_version != ABI_VERSION {
            return Err(HostError::AbiMismatch {
                path: path.to_path_buf(),
                expected: ABI_VERSION,
                found: descriptor.abi_version,
            });
        }
        let (create, metadata, destroy) =
            (descriptor.create, descriptor.metadata, descriptor.destroy);

        // SAFETY: `create` comes from a descriptor with a matching ABI version.
        let raw = unsafe { create() };
        let instance = NonNull::new(raw).ok_or_else(|| HostError::InstantiationFailed {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            instance,
            metadata,
            destroy,
            _context: context,
        })
    }
}

impl<M> PluginInstance<M> {
    /// Copies the plugin's self-declared metadata into a detached value.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidMetadata`] when the plugin reports no
    /// metadata, omits a required field, or reports non-UTF-8 text.
    pub fn metadata(&self) -> Result<PluginMetadata, HostError> {
        // SAFETY: `instance` is live until `Drop`, and the returned metadata is
        // owned by it.
        let copied = unsafe {
            (self.metadata)(self.instance.as_ptr().cast_const())
                .as_ref()
                .ok_or(MetadataError::Missing)
                .and_then(|raw| PluginMetadata::copy_from_raw(raw))
        };
        copied.map_err(|source| HostError::InvalidMetadata {
            path: self.path.clone(),
            source,
        })
    }
}

impl<M> Drop for PluginInstance<M> {
    fn drop(&mut self) {
        // SAFETY: `instance` was produced by the matching `create` and is
        // destroyed exactly once; the module stays mapped until `_context`
        // drops after this body.
        unsafe { (self.destroy)(self.instance.as_ptr()) };
    }
}

#[cfg(test)]
mod tests;
