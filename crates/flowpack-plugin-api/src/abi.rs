//! `#[repr(C)]` layout exchanged across the module boundary.

use std::ffi::c_void;
use std::ptr;
use std::str::Utf8Error;

use crate::Plugin;
use crate::export::{create_instance, destroy_instance, instance_metadata};

/// Version of the descriptor layout understood by this crate.
///
/// The host refuses modules whose descriptor reports a different value.
pub const ABI_VERSION: u32 = 1;

/// Name of the symbol every plugin module exports.
pub const DESCRIPTOR_SYMBOL: &str = "flowpack_plugin_descriptor";

/// Signature of the exported descriptor accessor.
pub type DescriptorFn = unsafe extern "C" fn() -> *const PluginDescriptor;

/// Borrowed UTF-8 string view. A null pointer encodes an absent value.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStr {
    pub(crate) ptr: *const u8,
    pub(crate) len: usize,
}

impl RawStr {
    /// The absent value.
    pub const ABSENT: Self = Self {
        ptr: ptr::null(),
        len: 0,
    };

    /// Borrows `value` without copying it.
    #[must_use]
    pub const fn new(value: &str) -> Self {
        Self {
            ptr: value.as_ptr(),
            len: value.len(),
        }
    }

    /// Borrows `value` when present, otherwise yields [`Self::ABSENT`].
    #[must_use]
    pub fn from_option(value: Option<&str>) -> Self {
        value.map_or(Self::ABSENT, Self::new)
    }

    /// Returns `true` when the view encodes an absent value.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.ptr.is_null()
    }

    /// Copies the referenced text into an owned string.
    ///
    /// # Safety
    ///
    /// When the pointer is non-null it must reference `len` initialised bytes
    /// that stay valid for the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns an error when the referenced bytes are not valid UTF-8.
    pub unsafe fn read(&self) -> Result<Option<String>, Utf8Error> {
        if self.ptr.is_null() {
            return Ok(None);
        }
        // SAFETY: the caller guarantees `ptr` references `len` valid bytes.
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        std::str::from_utf8(bytes).map(|text| Some(text.to_owned()))
    }
}

/// Borrowed array of [`RawStr`] values.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStrList {
    ptr: *const RawStr,
    len: usize,
}

impl RawStrList {
    /// Borrows `items` without copying them.
    #[must_use]
    pub const fn new(items: &[RawStr]) -> Self {
        Self {
            ptr: items.as_ptr(),
            len: items.len(),
        }
    }

    /// Number of entries in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.ptr.is_null() { 0 } else { self.len }
    }

    /// Returns `true` when the list holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every present entry into owned strings. Absent entries are
    /// skipped.
    ///
    /// # Safety
    ///
    /// When the pointer is non-null it must reference `len` initialised
    /// [`RawStr`] values, each of which satisfies [`RawStr::read`].
    ///
    /// # Errors
    ///
    /// Returns an error when any entry is not valid UTF-8.
    pub unsafe fn read(&self) -> Result<Vec<String>, Utf8Error> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        // SAFETY: the caller guarantees `ptr` references `len` entries.
        let items = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            // SAFETY: forwarded from the caller's guarantee.
            if let Some(value) = unsafe { item.read() }? {
                values.push(value);
            }
        }
        Ok(values)
    }
}

/// Metadata a plugin instance declares about itself.
///
/// Every pointer references memory owned by the plugin instance that produced
/// it and stays valid until that instance is destroyed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPluginMetadata {
    /// Unique plugin identifier.
    pub id: RawStr,
    /// Plugin type discriminator.
    pub plugin_type: RawStr,
    /// Plugin version.
    pub version: RawStr,
    /// Publishing company.
    pub company_name: RawStr,
    /// Free-form description.
    pub description: RawStr,
    /// Licence name.
    pub license: RawStr,
    /// Licence URL.
    pub license_url: RawStr,
    /// Icon reference.
    pub icon: RawStr,
    /// Project homepage.
    pub project_url: RawStr,
    /// Source repository URL.
    pub repository_url: RawStr,
    /// Copyright notice.
    pub copyright: RawStr,
    /// Readme reference.
    pub readme: RawStr,
    /// Author names.
    pub authors: RawStrList,
    /// Free-form tags.
    pub tags: RawStrList,
    /// Category identifier.
    pub category_id: RawStr,
    /// Oldest FlowSynx release the plugin supports.
    pub minimum_flowsynx_version: RawStr,
    /// FlowSynx release the plugin was built against.
    pub target_flowsynx_version: RawStr,
}

/// Entry points exported by a plugin module.
#[repr(C)]
#[derive(Debug)]
pub struct PluginDescriptor {
    /// Layout version; compared against [`ABI_VERSION`] by the host.
    pub abi_version: u32,
    /// Creates a plugin instance. Returns null when instantiation fails.
    pub create: unsafe extern "C" fn() -> *mut c_void,
    /// Returns the metadata of a live instance.
    pub metadata: unsafe extern "C" fn(*const c_void) -> *const RawPluginMetadata,
    /// Destroys an instance previously returned by `create`.
    pub destroy: unsafe extern "C" fn(*mut c_void),
}

impl PluginDescriptor {
    /// Builds the descriptor for plugin type `P`.
    #[must_use]
    pub const fn for_plugin<P: Plugin>() -> Self {
        Self {
            abi_version: ABI_VERSION,
            create: create_instance::<P>,
            metadata: instance_metadata::<P>,
            destroy: destroy_instance::<P>,
        }
    }
}
