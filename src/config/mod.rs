use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[cfg(test)]
mod tests;

/// On-disk tool configuration, all of it optional.
///
/// Read from `<config dir>/manifest-merge/config.toml`; a missing file yields
/// the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Registries reached over plain HTTP instead of TLS
    #[serde(default)]
    pub insecure_registries: Vec<String>,

    /// Static credentials keyed by registry host, consulted before any
    /// Docker config file
    #[serde(default)]
    pub registries: HashMap<String, RegistryCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    /// base64("user:pass"), as `docker login` stores it
    pub auth: Option<String>,
}

impl Config {
    /// Load the configuration, or defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        match Self::path() {
            Some(path) if path.is_file() => {
                let raw = std::fs::read_to_string(&path)?;
                Ok(toml::from_str(&raw)?)
            }
            _ => Ok(Self::default()),
        }
    }

    fn path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("manifest-merge").join("config.toml"))
    }
}
