use super::*;

#[test]
fn test_parse_full_config() {
    let content = r#"
        insecure_registries = ["localhost:5000"]

        [registries."gcr.io"]
        username = "oauth2accesstoken"
        password = "ya29.token"

        [registries."ghcr.io"]
        auth = "dXNlcjpwYXNz"
    "#;

    let config: Config = toml::from_str(content).unwrap();

    assert_eq!(config.insecure_registries, vec!["localhost:5000"]);
    assert_eq!(config.registries.len(), 2);

    let gcr = &config.registries["gcr.io"];
    assert_eq!(gcr.username, Some("oauth2accesstoken".to_string()));
    assert_eq!(gcr.password, Some("ya29.token".to_string()));
    assert_eq!(gcr.auth, None);

    let ghcr = &config.registries["ghcr.io"];
    assert_eq!(ghcr.auth, Some("dXNlcjpwYXNz".to_string()));
}

#[test]
fn test_empty_config_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.insecure_registries.is_empty());
    assert!(config.registries.is_empty());
}
