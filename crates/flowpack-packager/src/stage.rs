//! Named steps of a packaging run.

use std::fmt;

/// A step of the packaging pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Pre-flight checks on the project and output paths.
    Validate,
    /// Optional removal of previous build output.
    Clean,
    /// Compilation of the project.
    Build,
    /// Collection of the built module into the publish directory.
    Publish,
    /// Transient load of the published module to read its metadata.
    DiscoverMetadata,
    /// Projection of the metadata into `manifest.json`.
    SaveManifest,
    /// Compression of the publish directory into the plugin artifact.
    ZipPluginArtifact,
    /// SHA-256 digest of the plugin artifact.
    ComputeChecksum,
    /// Assembly of the final `.fspack` archive.
    AssembleFinalArchive,
    /// Removal of every temporary location.
    Cleanup,
}

impl Stage {
    /// Returns the stage name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Clean => "clean",
            Self::Build => "build",
            Self::Publish => "publish",
            Self::DiscoverMetadata => "discover-metadata",
            Self::SaveManifest => "save-manifest",
            Self::ZipPluginArtifact => "zip-plugin-artifact",
            Self::ComputeChecksum => "compute-checksum",
            Self::AssembleFinalArchive => "assemble-final-archive",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
