//! Generic entry points wired into [`PluginDescriptor`](crate::PluginDescriptor).

use std::ffi::c_void;
use std::panic;
use std::ptr;

use crate::abi::{RawPluginMetadata, RawStr, RawStrList};
use crate::{Plugin, PluginInfo};

/// Heap allocation handed to the host as an opaque instance pointer.
struct Hosted<P> {
    _plugin: P,
    exposed: ExposedMetadata,
}

/// Owns the strings referenced by `raw`.
///
/// The string and vector buffers live on the heap, so moving this struct does
/// not invalidate the pointers captured in `raw`.
struct ExposedMetadata {
    _info: PluginInfo,
    _authors: Vec<RawStr>,
    _tags: Vec<RawStr>,
    raw: RawPluginMetadata,
}

impl ExposedMetadata {
    fn new(info: PluginInfo) -> Self {
        let authors: Vec<RawStr> = info.authors.iter().map(|item| RawStr::new(item)).collect();
        let tags: Vec<RawStr> = info.tags.iter().map(|item| RawStr::new(item)).collect();
        let raw = RawPluginMetadata {
            id: RawStr::new(&info.id),
            plugin_type: RawStr::new(&info.plugin_type),
            version: RawStr::new(&info.version),
            company_name: RawStr::new(&info.company_name),
            description: RawStr::from_option(info.description.as_deref()),
            license: RawStr::from_option(info.license.as_deref()),
            license_url: RawStr::from_option(info.license_url.as_deref()),
            icon: RawStr::from_option(info.icon.as_deref()),
            project_url: RawStr::from_option(info.project_url.as_deref()),
            repository_url: RawStr::from_option(info.repository_url.as_deref()),
            copyright: RawStr::from_option(info.copyright.as_deref()),
            readme: RawStr::from_option(info.readme.as_deref()),
            authors: RawStrList::new(&authors),
            tags: RawStrList::new(&tags),
            category_id: RawStr::new(&info.category_id),
            minimum_flowsynx_version: RawStr::new(&info.minimum_flowsynx_version),
            target_flowsynx_version: RawStr::from_option(info.target_flowsynx_version.as_deref()),
        };
        Self {
            _info: info,
            _authors: authors,
            _tags: tags,
            raw,
        }
    }
}

pub(crate) unsafe extern "C" fn create_instance<P: Plugin>() -> *mut c_void {
    // A panic must not unwind across the C boundary.
    let created = panic::catch_unwind(|| {
        let plugin = P::default();
        let exposed = ExposedMetadata::new(plugin.info());
        Box::new(Hosted {
            _plugin: plugin,
            exposed,
        })
    });
    created.map_or(ptr::null_mut(), |hosted| Box::into_raw(hosted).cast())
}

pub(crate) unsafe extern "C" fn instance_metadata<P: Plugin>(
    instance: *const c_void,
) -> *const RawPluginMetadata {
    if instance.is_null() {
        return ptr::null();
    }
    // SAFETY: non-null instances originate from `create_instance::<P>`.
    let hosted = unsafe { &*instance.cast::<Hosted<P>>() };
    &hosted.exposed.raw
}

pub(crate) unsafe extern "C" fn destroy_instance<P: Plugin>(instance: *mut c_void) {
    if instance.is_null() {
        return;
    }
    // SAFETY: non-null instances originate from `create_instance::<P>` and are
    // destroyed at most once.
    drop(unsafe { Box::from_raw(instance.cast::<Hosted<P>>()) });
}
