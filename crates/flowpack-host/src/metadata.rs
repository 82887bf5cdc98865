//! Detached plugin metadata.

use serde::{Deserialize, Serialize};

use flowpack_plugin_api::{RawPluginMetadata, RawStr, RawStrList};

use crate::error::MetadataError;

/// Self-declared plugin identity copied out of a loaded module.
///
/// Values own all of their data and carry no reference back to the module
/// they were read from, so they remain valid after the module is released.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    /// Unique plugin identifier.
    pub id: String,
    /// Plugin type discriminator.
    #[serde(rename = "type")]
    pub plugin_type: String,
    /// Plugin version.
    pub version: String,
    /// Publishing company.
    pub company_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Licence name.
    pub license: Option<String>,
    /// Licence URL.
    pub license_url: Option<String>,
    /// Icon reference.
    pub icon: Option<String>,
    /// Project homepage.
    pub project_url: Option<String>,
    /// Source repository URL.
    pub repository_url: Option<String>,
    /// Copyright notice.
    pub copyright: Option<String>,
    /// Readme reference.
    pub readme: Option<String>,
    /// Author names in declaration order.
    pub authors: Vec<String>,
    /// Tags in declaration order.
    pub tags: Vec<String>,
    /// Category identifier.
    pub category_id: String,
    /// Oldest FlowSynx release the plugin supports.
    #[serde(rename = "minimumFlowSynxVersion")]
    pub minimum_flowsynx_version: String,
    /// FlowSynx release the plugin was built against.
    #[serde(rename = "targetFlowSynxVersion")]
    pub target_flowsynx_version: Option<String>,
}

impl PluginMetadata {
    /// Copies every field out of `raw`.
    ///
    /// # Safety
    ///
    /// Every pointer in `raw` must satisfy the contracts of [`RawStr::read`]
    /// and [`RawStrList::read`] for the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when a required field is absent or any field
    /// is not valid UTF-8.
    pub unsafe fn copy_from_raw(raw: &RawPluginMetadata) -> Result<Self, MetadataError> {
        // SAFETY: every read below is covered by the caller's guarantee.
        unsafe {
            Ok(Self {
                id: required(raw.id, "id")?,
                plugin_type: required(raw.plugin_type, "type")?,
                version: required(raw.version, "version")?,
                company_name: required(raw.company_name, "companyName")?,
                description: optional(raw.description, "description")?,
                license: optional(raw.license, "license")?,
                license_url: optional(raw.license_url, "licenseUrl")?,
                icon: optional(raw.icon, "icon")?,
                project_url: optional(raw.project_url, "projectUrl")?,
                repository_url: optional(raw.repository_url, "repositoryUrl")?,
                copyright: optional(raw.copyright, "copyright")?,
                readme: optional(raw.readme, "readme")?,
                authors: list(raw.authors, "authors")?,
                tags: list(raw.tags, "tags")?,
                category_id: required(raw.category_id, "categoryId")?,
                minimum_flowsynx_version: required(
                    raw.minimum_flowsynx_version,
                    "minimumFlowSynxVersion",
                )?,
                target_flowsynx_version: optional(
                    raw.target_flowsynx_version,
                    "targetFlowSynxVersion",
                )?,
            })
        }
    }
}

unsafe fn optional(value: RawStr, field: &'static str) -> Result<Option<String>, MetadataError> {
    // SAFETY: forwarded from `copy_from_raw`.
    unsafe { value.read() }.map_err(|source| MetadataError::InvalidText { field, source })
}

unsafe fn required(value: RawStr, field: &'static str) -> Result<String, MetadataError> {
    // SAFETY: forwarded from `copy_from_raw`.
    unsafe { optional(value, field) }?.ok_or(MetadataError::MissingField { field })
}

unsafe fn list(value: RawStrList, field: &'static str) -> Result<Vec<String>, MetadataError> {
    // SAFETY: forwarded from `copy_from_raw`.
    unsafe { value.read() }.map_err(|source| MetadataError::InvalidText { field, source })
}
