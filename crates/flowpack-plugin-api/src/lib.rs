//! C-compatible plugin ABI shared by FlowPack plugins and the packaging host.
//!
//! A FlowPack plugin is a `cdylib` that exports a single descriptor accessor
//! named [`DESCRIPTOR_SYMBOL`]. The descriptor carries the ABI version and
//! three entry points: one that instantiates the plugin, one that exposes its
//! declared metadata, and one that destroys the instance again. Plugin authors
//! never touch those entry points directly; they implement [`Plugin`] and
//! invoke [`export_plugin!`]:
//!
//! ```
//! use flowpack_plugin_api::{Plugin, PluginInfo, export_plugin};
//!
//! #[derive(Default)]
//! struct Echo;
//!
//! impl Plugin for Echo {
//!     fn info(&self) -> PluginInfo {
//!         PluginInfo::new("acme.echo", "Transform", "1.0.0", "Acme", "Utilities", "1.0.0")
//!     }
//! }
//!
//! export_plugin!(Echo);
//! ```
//!
//! The host side reads the same layout through [`RawPluginMetadata`] and copies
//! every field out before the module is released.

mod abi;
mod export;
mod info;

pub use abi::{
    ABI_VERSION, DESCRIPTOR_SYMBOL, DescriptorFn, PluginDescriptor, RawPluginMetadata, RawStr,
    RawStrList,
};
pub use info::{Plugin, PluginInfo};

/// Exports the descriptor accessor for a [`Plugin`] implementation.
///
/// The macro must be invoked exactly once per `cdylib`.
#[macro_export]
macro_rules! export_plugin {
    ($plugin:ty) => {
        /// Descriptor accessor resolved by the FlowPack host.
        #[unsafe(no_mangle)]
        pub extern "C" fn flowpack_plugin_descriptor() -> *const $crate::PluginDescriptor {
            static DESCRIPTOR: $crate::PluginDescriptor =
                $crate::PluginDescriptor::for_plugin::<$plugin>();
            &DESCRIPTOR
        }
    };
}
