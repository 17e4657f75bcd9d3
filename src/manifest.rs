use oci_distribution::Reference;
use serde::{Deserialize, Serialize};

use crate::constants::{media_type, schema};
use crate::error::MergeError;

/// Manifest list (image index) for multi-arch support.
///
/// Doubles as the output document being accumulated and as the parsed body of
/// a manifest-list input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageIndex {
    #[serde(rename = "schemaVersion")]
    pub schema_version: i32,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub manifests: Vec<ManifestDescriptor>,
}

impl ImageIndex {
    /// Create an empty index. Schema version and media type are fixed here,
    /// once, no matter what kinds of manifest later merge into it.
    pub fn new() -> Self {
        Self {
            schema_version: schema::VERSION,
            media_type: media_type::MANIFEST_LIST.to_string(),
            manifests: Vec::new(),
        }
    }
}

impl Default for ImageIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor for a platform-specific manifest in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub size: i64,
    pub digest: String,
    pub platform: Platform,
}

/// Platform a manifest targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(rename = "os.version", skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Single-platform image manifest body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageManifest {
    #[serde(rename = "schemaVersion")]
    pub schema_version: i32,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub config: Descriptor,
    pub layers: Vec<Descriptor>,
}

/// Reference to a blob, optionally annotated with platform info.
///
/// Registries rarely attach `platform` to a config descriptor; when they do it
/// is taken at face value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub size: i64,
    pub digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// The subset of the image configuration blob needed to recover platform data.
///
/// `os.version` is a non-standard key that only appears in this raw legacy
/// document, which is why resolution decodes the blob itself instead of
/// trusting a structured field.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub architecture: String,
    pub os: String,
    #[serde(rename = "os.version")]
    pub os_version: Option<String>,
}

/// The two manifest kinds the merger understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Multi-platform manifest list
    List,
    /// Single-platform image manifest
    Image,
}

impl ManifestKind {
    /// Classify a media type, or `None` for anything outside the two kinds.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            media_type::MANIFEST_LIST => Some(Self::List),
            media_type::MANIFEST => Some(Self::Image),
            _ => None,
        }
    }
}

/// A manifest as retrieved from the registry: its media type, content digest,
/// and the raw serialized body it was served as.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub media_type: String,
    pub digest: String,
    pub raw: Vec<u8>,
}

impl FetchedManifest {
    /// Build from a raw manifest body, probing the embedded media type.
    pub fn from_raw(
        reference: &Reference,
        raw: Vec<u8>,
        digest: String,
    ) -> Result<Self, MergeError> {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(rename = "mediaType", default)]
            media_type: String,
        }

        let probe: Probe =
            serde_json::from_slice(&raw).map_err(|source| MergeError::Decode {
                reference: reference.to_string(),
                what: "manifest",
                source,
            })?;

        Ok(Self {
            media_type: probe.media_type,
            digest,
            raw,
        })
    }

    /// Classify this manifest by its media type.
    pub fn kind(&self) -> Option<ManifestKind> {
        ManifestKind::from_media_type(&self.media_type)
    }

    pub fn parse_list(&self, reference: &Reference) -> Result<ImageIndex, MergeError> {
        serde_json::from_slice(&self.raw).map_err(|source| MergeError::Decode {
            reference: reference.to_string(),
            what: "manifest list",
            source,
        })
    }

    pub fn parse_image(&self, reference: &Reference) -> Result<ImageManifest, MergeError> {
        serde_json::from_slice(&self.raw).map_err(|source| MergeError::Decode {
            reference: reference.to_string(),
            what: "image manifest",
            source,
        })
    }
}
