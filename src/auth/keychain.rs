//! Reference-to-credential resolution

use super::{Credential, DockerConfigFile};
use anyhow::{bail, Context, Result};
use oci_distribution::Reference;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Resolves the credential to use for an image reference.
///
/// Sources, in order: static credentials from the tool's configuration, the
/// `auths` entries of the first readable Docker config file, a credential
/// helper named by that file. Every miss or failure degrades to anonymous.
pub struct Keychain {
    static_auths: HashMap<String, Credential>,
    /// Docker config, loaded once on first lookup
    docker_config: OnceLock<DockerConfigFile>,
}

impl Keychain {
    pub fn new(static_auths: HashMap<String, Credential>) -> Self {
        Self {
            static_auths,
            docker_config: OnceLock::new(),
        }
    }

    /// Resolve the credential for a reference's registry. An empty credential
    /// means no source knew the registry.
    pub fn lookup(&self, reference: &Reference) -> Credential {
        let registry = reference.registry();
        let keys = registry_keys(registry);

        for key in &keys {
            if let Some(credential) = self.static_auths.get(key) {
                if !credential.is_empty() {
                    debug!(registry, "using static credentials");
                    return credential.clone();
                }
            }
        }

        let config = self.docker_config();
        for key in &keys {
            if let Some(credential) = config.auths.get(key) {
                if !credential.is_empty() {
                    debug!(registry, "using Docker config credentials");
                    return credential.clone();
                }
            }
        }

        if let Some(helper) = config.helper_for(registry) {
            match run_credential_helper(helper, registry) {
                Ok(credential) => return credential,
                Err(err) => warn!("credential helper {} failed: {:#}", helper, err),
            }
        }

        debug!(registry, "no credentials found, using anonymous access");
        Credential::default()
    }

    fn docker_config(&self) -> &DockerConfigFile {
        self.docker_config.get_or_init(load_docker_config)
    }
}

impl Default for Keychain {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

/// Candidate Docker config locations, most specific first.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
        paths.push(PathBuf::from(dir).join("config.json"));
    }
    if let Ok(file) = std::env::var("REGISTRY_AUTH_FILE") {
        paths.push(PathBuf::from(file));
    }
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        paths.push(PathBuf::from(dir).join("containers").join("auth.json"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".docker").join("config.json"));
    }
    paths
}

/// Read the first parseable Docker config file, or an empty one when none of
/// the candidate locations holds one.
fn load_docker_config() -> DockerConfigFile {
    for path in config_paths() {
        if !path.is_file() {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from));
        match parsed {
            Ok(config) => {
                debug!(path = %path.display(), "loaded Docker config");
                return config;
            }
            Err(err) => {
                warn!(path = %path.display(), "skipping unreadable Docker config: {:#}", err);
            }
        }
    }
    DockerConfigFile::default()
}

/// Keys a registry may appear under in a config file.
///
/// `docker login` records Docker Hub credentials under the legacy v1 endpoint
/// URL, and some tools write scheme-prefixed keys for other registries.
fn registry_keys(registry: &str) -> Vec<String> {
    match registry {
        "docker.io" | "index.docker.io" | "registry-1.docker.io" => vec![
            "docker.io".to_string(),
            "index.docker.io".to_string(),
            "registry-1.docker.io".to_string(),
            "https://index.docker.io/v1/".to_string(),
        ],
        _ => vec![
            registry.to_string(),
            format!("https://{registry}"),
            format!("https://{registry}/v1/"),
        ],
    }
}

/// Run `docker-credential-<helper> get`, feeding it the registry on stdin.
fn run_credential_helper(helper: &str, registry: &str) -> Result<Credential> {
    let program = format!("docker-credential-{helper}");
    debug!(%program, registry, "invoking credential helper");

    let mut child = Command::new(&program)
        .arg("get")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {program}"))?;

    child
        .stdin
        .take()
        .context("helper stdin unavailable")?
        .write_all(registry.as_bytes())?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        bail!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    #[derive(serde::Deserialize)]
    struct HelperOutput {
        #[serde(rename = "Username")]
        username: String,
        #[serde(rename = "Secret")]
        secret: String,
    }

    let parsed: HelperOutput =
        serde_json::from_slice(&output.stdout).context("malformed helper output")?;
    Ok(Credential::basic(parsed.username, parsed.secret))
}
