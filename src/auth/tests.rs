use super::*;
use oci_distribution::secrets::RegistryAuth;

#[test]
fn test_docker_config_file_parsing() {
    let raw = r#"{
        "auths": {
            "docker.io": {
                "auth": "dXNlcjpwYXNz"
            },
            "gcr.io": {
                "username": "oauth2accesstoken",
                "password": "ya29.token",
                "registrytoken": "bearer-token"
            }
        },
        "credHelpers": {
            "ecr.amazonaws.com": "ecr-login"
        },
        "credsStore": "osxkeychain"
    }"#;

    let config: DockerConfigFile = serde_json::from_str(raw).unwrap();

    assert_eq!(config.auths.len(), 2);
    assert_eq!(
        config.auths["docker.io"].auth,
        Some("dXNlcjpwYXNz".to_string())
    );
    assert_eq!(
        config.auths["gcr.io"].username,
        Some("oauth2accesstoken".to_string())
    );
    assert_eq!(
        config.auths["gcr.io"].registry_token,
        Some("bearer-token".to_string())
    );
    assert_eq!(config.cred_helpers["ecr.amazonaws.com"], "ecr-login");
    assert_eq!(config.creds_store, Some("osxkeychain".to_string()));
}

#[test]
fn test_helper_for_prefers_registry_entry_over_store() {
    let config: DockerConfigFile = serde_json::from_str(
        r#"{"credHelpers": {"ecr.amazonaws.com": "ecr-login"}, "credsStore": "pass"}"#,
    )
    .unwrap();

    assert_eq!(config.helper_for("ecr.amazonaws.com"), Some("ecr-login"));
    assert_eq!(config.helper_for("gcr.io"), Some("pass"));
}

#[test]
fn test_helper_for_without_any_helper() {
    let config: DockerConfigFile = serde_json::from_str(r#"{"auths": {}}"#).unwrap();
    assert_eq!(config.helper_for("gcr.io"), None);
}

#[test]
fn test_empty_credential_is_anonymous() {
    let credential = Credential::default();
    assert!(credential.is_empty());
    assert!(matches!(
        credential.registry_auth(),
        RegistryAuth::Anonymous
    ));
}

#[test]
fn test_basic_credential_to_registry_auth() {
    let credential = Credential::basic("user", "pass");
    assert!(!credential.is_empty());

    match credential.registry_auth() {
        RegistryAuth::Basic(username, password) => {
            assert_eq!(username, "user");
            assert_eq!(password, "pass");
        }
        other => panic!("expected basic auth, got {:?}", other),
    }
}

#[test]
fn test_packed_auth_field_decodes_to_basic() {
    // base64("user:pass")
    let credential = Credential {
        auth: Some("dXNlcjpwYXNz".to_string()),
        ..Default::default()
    };

    match credential.registry_auth() {
        RegistryAuth::Basic(username, password) => {
            assert_eq!(username, "user");
            assert_eq!(password, "pass");
        }
        other => panic!("expected basic auth, got {:?}", other),
    }
}

#[test]
fn test_undecodable_auth_field_degrades_to_anonymous() {
    let credential = Credential {
        auth: Some("%%%not-base64%%%".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        credential.registry_auth(),
        RegistryAuth::Anonymous
    ));
}

#[test]
fn test_token_only_credential_degrades_to_anonymous() {
    let credential = Credential {
        registry_token: Some("bearer-token".to_string()),
        ..Default::default()
    };
    assert!(!credential.is_empty());
    assert!(matches!(
        credential.registry_auth(),
        RegistryAuth::Anonymous
    ));
}
