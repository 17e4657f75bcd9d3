//! Registry credential discovery
//!
//! Resolves credentials the way container tooling does: static credentials
//! from the tool's own configuration, then Docker config files, then
//! credential helpers, with anonymous access as the final fallback.

use base64::Engine;
use oci_distribution::secrets::RegistryAuth;
use serde::Deserialize;
use std::collections::HashMap;

mod keychain;

pub use keychain::Keychain;

#[cfg(test)]
mod tests;

/// One credential, in the shape a Docker config `auths` entry stores it.
///
/// Also used for credentials supplied through the tool's configuration. A
/// value with every field unset means anonymous access.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credential {
    pub username: Option<String>,
    pub password: Option<String>,
    /// base64("user:pass"), the form `docker login` writes
    pub auth: Option<String>,
    #[serde(rename = "identitytoken")]
    pub identity_token: Option<String>,
    #[serde(rename = "registrytoken")]
    pub registry_token: Option<String>,
}

impl Credential {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.auth.is_none()
            && self.identity_token.is_none()
            && self.registry_token.is_none()
    }

    /// Lower to the transport's auth type.
    ///
    /// An explicit username/password pair wins over the packed `auth` field.
    /// Token-only entries have no counterpart on the transport side and lower
    /// to anonymous.
    pub fn registry_auth(&self) -> RegistryAuth {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return RegistryAuth::Basic(username.clone(), password.clone());
        }
        if let Some((username, password)) = self.auth.as_deref().and_then(decode_auth_pair) {
            return RegistryAuth::Basic(username, password);
        }
        RegistryAuth::Anonymous
    }
}

/// Split a Docker config `auth` value back into its username/password pair.
fn decode_auth_pair(encoded: &str) -> Option<(String, String)> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// The subset of a Docker config file the keychain reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfigFile {
    #[serde(default)]
    pub auths: HashMap<String, Credential>,
    #[serde(rename = "credHelpers", default)]
    pub cred_helpers: HashMap<String, String>,
    #[serde(rename = "credsStore")]
    pub creds_store: Option<String>,
}

impl DockerConfigFile {
    /// The credential helper configured for a registry: a per-registry
    /// `credHelpers` entry, else the global `credsStore`.
    pub fn helper_for(&self, registry: &str) -> Option<&str> {
        self.cred_helpers
            .get(registry)
            .or(self.creds_store.as_ref())
            .map(String::as_str)
    }
}
