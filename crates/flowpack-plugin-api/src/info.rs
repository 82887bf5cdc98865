//! Plugin-side metadata declaration.

/// Behaviour every FlowPack plugin implements.
///
/// Instances are created through [`Default`] when the host instantiates the
/// module, so construction must not depend on external state.
pub trait Plugin: Default + 'static {
    /// Describes the plugin. Called once per instance.
    fn info(&self) -> PluginInfo;
}

/// Metadata a plugin declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginInfo {
    /// Unique plugin identifier.
    pub id: String,
    /// Plugin type discriminator.
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
    /// Author names.
    pub authors: Vec<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Category identifier.
    pub category_id: String,
    /// Oldest FlowSynx release the plugin supports.
    pub minimum_flowsynx_version: String,
    /// FlowSynx release the plugin was built against.
    pub target_flowsynx_version: Option<String>,
}

impl PluginInfo {
    /// Creates metadata carrying only the required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        plugin_type: impl Into<String>,
        version: impl Into<String>,
        company_name: impl Into<String>,
        category_id: impl Into<String>,
        minimum_flowsynx_version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            plugin_type: plugin_type.into(),
            version: version.into(),
            company_name: company_name.into(),
            category_id: category_id.into(),
            minimum_flowsynx_version: minimum_flowsynx_version.into(),
            ..Self::default()
        }
    }
}
