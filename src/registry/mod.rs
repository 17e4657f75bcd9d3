use async_trait::async_trait;
use oci_distribution::client::{Client, ClientConfig, ClientProtocol};
use oci_distribution::manifest::{
    ImageIndexEntry, OciDescriptor, OciImageIndex, OciManifest, Platform,
};
use oci_distribution::secrets::RegistryAuth;
use oci_distribution::{Reference, RegistryOperation};
use tracing::{debug, info};

use crate::auth::{Credential, Keychain};
use crate::config::Config;
use crate::constants::media_type;
use crate::error::MergeError;
use crate::manifest::{Descriptor, FetchedManifest, ImageIndex};


/// Media types offered to the registry when pulling a manifest.
const ACCEPTED_MEDIA_TYPES: &[&str] = &[media_type::MANIFEST_LIST, media_type::MANIFEST];

/// Operations the merge engine needs from a container registry.
#[async_trait]
pub trait Registry {
    /// Fetch the manifest a reference points at, with its raw body and digest.
    async fn fetch_manifest(&mut self, reference: &Reference)
        -> Result<FetchedManifest, MergeError>;

    /// Fetch the blob a descriptor references from the repository the
    /// reference points at.
    async fn fetch_blob(
        &mut self,
        reference: &Reference,
        descriptor: &Descriptor,
    ) -> Result<Vec<u8>, MergeError>;

    /// Publish a merged index under the given reference.
    async fn publish_manifest(
        &mut self,
        reference: &Reference,
        index: &ImageIndex,
    ) -> Result<(), MergeError>;
}

/// Parse an image reference string the way the registry understands it.
pub fn parse_reference(name: &str) -> Result<Reference, MergeError> {
    name.parse().map_err(|source| MergeError::Reference {
        name: name.to_string(),
        source,
    })
}

/// Registry client backed by `oci_distribution`, resolving credentials per
/// reference through the keychain.
pub struct RegistryClient {
    client: Client,
    keychain: Keychain,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Self {
        let protocol = if config.insecure_registries.is_empty() {
            ClientProtocol::Https
        } else {
            ClientProtocol::HttpsExcept(config.insecure_registries.clone())
        };
        let client = Client::new(ClientConfig {
            protocol,
            ..Default::default()
        });

        let static_auths = config
            .registries
            .iter()
            .map(|(registry, creds)| {
                (
                    registry.clone(),
                    Credential {
                        username: creds.username.clone(),
                        password: creds.password.clone(),
                        auth: creds.auth.clone(),
                        ..Default::default()
                    },
                )
            })
            .collect();

        Self {
            client,
            keychain: Keychain::new(static_auths),
        }
    }

    /// Credentials for a reference, resolved through the keychain.
    fn auth_for(&self, reference: &Reference) -> RegistryAuth {
        self.keychain.lookup(reference).registry_auth()
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn fetch_manifest(
        &mut self,
        reference: &Reference,
    ) -> Result<FetchedManifest, MergeError> {
        let auth = self.auth_for(reference);
        self.client
            .auth(reference, &auth, RegistryOperation::Pull)
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        let (raw, digest) = self
            .client
            .pull_manifest_raw(reference, &auth, ACCEPTED_MEDIA_TYPES)
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        debug!(reference = %reference, digest = %digest, "fetched manifest");
        FetchedManifest::from_raw(reference, raw, digest)
    }

    async fn fetch_blob(
        &mut self,
        reference: &Reference,
        descriptor: &Descriptor,
    ) -> Result<Vec<u8>, MergeError> {
        let auth = self.auth_for(reference);
        self.client
            .auth(reference, &auth, RegistryOperation::Pull)
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        let mut raw = Vec::new();
        self.client
            .pull_blob(reference, &oci_descriptor(descriptor), &mut raw)
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        debug!(reference = %reference, digest = %descriptor.digest, size = raw.len(), "fetched blob");
        Ok(raw)
    }

    async fn publish_manifest(
        &mut self,
        reference: &Reference,
        index: &ImageIndex,
    ) -> Result<(), MergeError> {
        let auth = self.auth_for(reference);
        self.client
            .auth(reference, &auth, RegistryOperation::Push)
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        let url = self
            .client
            .push_manifest(reference, &OciManifest::ImageIndex(oci_index(index)))
            .await
            .map_err(|err| MergeError::transport(reference, err))?;

        info!(reference = %reference, url = %url, "published manifest list");
        Ok(())
    }
}

/// Lower a descriptor to the transport's descriptor type.
fn oci_descriptor(descriptor: &Descriptor) -> OciDescriptor {
    OciDescriptor {
        media_type: descriptor.media_type.clone(),
        digest: descriptor.digest.clone(),
        size: descriptor.size,
        urls: None,
        annotations: None,
    }
}

/// Lower the merged index to the transport's index type for publishing.
fn oci_index(index: &ImageIndex) -> OciImageIndex {
    let manifests: Vec<ImageIndexEntry> = index
        .manifests
        .iter()
        .map(|m| ImageIndexEntry {
            media_type: m.media_type.clone(),
            digest: m.digest.clone(),
            size: m.size,
            platform: Some(Platform {
                architecture: m.platform.architecture.clone(),
                os: m.platform.os.clone(),
                os_version: m.platform.os_version.clone(),
                os_features: None,
                variant: m.platform.variant.clone(),
                features: None,
            }),
            annotations: None,
        })
        .collect();

    OciImageIndex {
        schema_version: 2,
        media_type: Some(index.media_type.clone()),
        manifests,
        annotations: None,
    }
}
