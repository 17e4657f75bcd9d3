//! The merge engine: classifies fetched manifests and folds their platform
//! descriptors into a single manifest list.

use oci_distribution::Reference;
use tracing::{debug, info};

use crate::constants::media_type;
use crate::error::MergeError;
use crate::manifest::{
    Descriptor, FetchedManifest, ImageConfig, ImageIndex, ManifestDescriptor, ManifestKind,
    Platform,
};
use crate::registry::Registry;


/// Fetch every source reference in order, merge each manifest, and serialize
/// the accumulated index. When `target` is given the index is also published
/// there.
///
/// The first failure of any step aborts the whole run; nothing is published
/// and the serialized document is never produced partially.
pub async fn run<R: Registry>(
    registry: &mut R,
    sources: &[Reference],
    target: Option<&Reference>,
) -> Result<String, MergeError> {
    let mut index = ImageIndex::new();

    for reference in sources {
        debug!(reference = %reference, "fetching manifest");
        let fetched = registry.fetch_manifest(reference).await?;
        index = merge_into(index, registry, reference, &fetched).await?;
    }

    let serialized =
        serde_json::to_string(&index).map_err(|source| MergeError::Encode { source })?;

    if let Some(target) = target {
        registry.publish_manifest(target, &index).await?;
    }

    Ok(serialized)
}

/// Merge one fetched manifest into the index, returning the grown index.
///
/// A manifest list contributes its descriptor sequence unchanged, in the order
/// the list declares it. A single-platform manifest contributes exactly one
/// descriptor for itself. Duplicate platforms across inputs are kept as-is.
pub async fn merge_into<R: Registry>(
    mut index: ImageIndex,
    registry: &mut R,
    reference: &Reference,
    fetched: &FetchedManifest,
) -> Result<ImageIndex, MergeError> {
    let kind = fetched
        .kind()
        .ok_or_else(|| MergeError::UnsupportedFormat {
            reference: reference.to_string(),
            media_type: fetched.media_type.clone(),
        })?;

    match kind {
        ManifestKind::List => {
            let list = fetched.parse_list(reference)?;
            for descriptor in &list.manifests {
                found_image(reference, &descriptor.platform);
            }
            index.manifests.extend(list.manifests);
        }
        ManifestKind::Image => {
            let manifest = fetched.parse_image(reference)?;
            if manifest.config.media_type != media_type::IMAGE_CONFIG {
                return Err(MergeError::UnsupportedFormat {
                    reference: reference.to_string(),
                    media_type: manifest.config.media_type,
                });
            }

            let platform = resolve_platform(registry, reference, &manifest.config).await?;
            found_image(reference, &platform);

            index.manifests.push(ManifestDescriptor {
                media_type: fetched.media_type.clone(),
                size: fetched.raw.len() as i64,
                digest: fetched.digest.clone(),
                platform,
            });
        }
    }

    Ok(index)
}

/// Resolve the platform for a single-platform manifest.
///
/// The structured platform on the config descriptor wins when the registry
/// attached one; otherwise the raw config blob is fetched and decoded.
async fn resolve_platform<R: Registry>(
    registry: &mut R,
    reference: &Reference,
    config: &Descriptor,
) -> Result<Platform, MergeError> {
    if let Some(platform) = &config.platform {
        return Ok(platform.clone());
    }

    let raw = registry.fetch_blob(reference, config).await?;
    platform_from_config(reference, &raw)
}

/// Extract a platform from a raw image configuration blob.
///
/// `os.version` is read from the legacy document because the structured
/// platform object some registries attach drops it.
fn platform_from_config(reference: &Reference, raw: &[u8]) -> Result<Platform, MergeError> {
    let config: ImageConfig =
        serde_json::from_slice(raw).map_err(|source| MergeError::Decode {
            reference: reference.to_string(),
            what: "image config",
            source,
        })?;

    Ok(Platform {
        architecture: config.architecture,
        os: config.os,
        os_version: config.os_version,
        variant: None,
    })
}

fn found_image(reference: &Reference, platform: &Platform) {
    info!(
        reference = %reference,
        architecture = %platform.architecture,
        os = %platform.os,
        os.version = platform.os_version.as_deref().unwrap_or(""),
        "found image"
    );
}
