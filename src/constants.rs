/// Media type constants for the Docker v2 manifest scheme
pub mod media_type {
    /// Multi-platform manifest list
    pub const MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

    /// Single-platform image manifest
    pub const MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";

    /// Image configuration blob referenced by a single-platform manifest
    pub const IMAGE_CONFIG: &str = "application/vnd.docker.container.image.v1+json";
}

/// Manifest schema constants
pub mod schema {
    /// Schema version carried by every v2 manifest document
    pub const VERSION: i32 = 2;
}
