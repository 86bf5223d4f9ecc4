//! Tests for loading config documents from disk and resolving credentials
//! against the real process environment.

use aftership_config::{
    ConfigError, ConfigStore, CredentialResolver, GlobalSettings, ResolvedConfig, Service,
    ServiceConfig, SharedAccount, TemplateKind,
};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

fn clean_env() {
    for service in Service::ALL {
        env::remove_var(service.api_key_env_var());
        env::remove_var(service.base_url_env_var());
    }
}

#[test]
fn test_load_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aftership.yaml");
    fs::write(
        &path,
        r#"
afterdark_account:
  username: ops@example.com
  api_key: master-key
darkship:
  api_key: darkship-specific-key
darkstorage:
  base_url: https://custom.darkstorage.io
settings:
  timeout: 60
"#,
    )
    .unwrap();

    let config = ConfigStore::load_from_path(&path).unwrap();
    assert_eq!(config.settings.timeout, 60);
    assert!(config.settings.verify_tls);
    assert_eq!(
        config.shared_account.as_ref().unwrap().username.as_deref(),
        Some("ops@example.com")
    );
    assert_eq!(config.services.len(), 2);
}

#[test]
fn test_missing_explicit_path_is_not_found() {
    let dir = tempdir().unwrap();
    let err = ConfigStore::load_from_path(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");
}

#[test]
fn test_empty_files_are_rejected() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("blank.yaml", ""),
        ("comments.yaml", "# nothing here\n\n"),
        ("null.yaml", "~\n"),
        ("empty_map.yaml", "{}\n"),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let err = ConfigStore::load_from_path(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::Empty { .. }),
            "{} should be empty, got {:?}",
            name,
            err
        );
    }
}

#[test]
fn test_unparseable_file_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "darkship: {api_key: [unterminated\n").unwrap();

    match ConfigStore::load_from_path(&path).unwrap_err() {
        ConfigError::Malformed {
            path: Some(p),
            source,
            ..
        } => {
            assert_eq!(p, path);
            assert!(source.is_some(), "parser error should be kept");
        }
        other => panic!("expected malformed, got {:?}", other),
    }
}

#[test]
fn test_merge_keys_in_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("anchors.yaml");
    fs::write(
        &path,
        r#"
staging: &staging
  base_url: https://staging.darkship.io
darkship:
  <<: *staging
  api_key: dk1
shipshack:
  <<: *staging
"#,
    )
    .unwrap();

    let config = ConfigStore::load_from_path(&path).unwrap();
    let darkship = config.service(Service::Darkship).unwrap();
    assert_eq!(darkship.api_key.as_deref(), Some("dk1"));
    assert_eq!(darkship.base_url.as_deref(), Some("https://staging.darkship.io"));
    assert_eq!(
        config.service(Service::Shipshack).unwrap().base_url.as_deref(),
        Some("https://staging.darkship.io")
    );
}

#[test]
fn test_zero_timeout_in_file_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zero.yaml");
    fs::write(&path, "settings:\n  timeout: 0\n").unwrap();

    let err = ConfigStore::load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }));
    assert!(err.to_string().contains("positive"));
}

#[test]
fn test_non_mapping_document_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.yaml");
    fs::write(&path, "- darkship\n- aiserve\n").unwrap();
    assert!(matches!(
        ConfigStore::load_from_path(&path),
        Err(ConfigError::Malformed { .. })
    ));
}

#[test]
fn test_shape_error_carries_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shape.yaml");
    fs::write(&path, "settings:\n  timeout: forever\n").unwrap();

    let err = ConfigStore::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("shape.yaml"));
}

#[test]
fn test_first_existing_path_wins() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("missing.yaml");
    let second = dir.path().join("second.yaml");
    let third = dir.path().join("third.yaml");
    fs::write(&second, "aiserve: {api_key: from-second}\n").unwrap();
    fs::write(&third, "aiserve: {api_key: from-third}\n").unwrap();

    let config = ConfigStore::load_from_first_existing_path(&[first, second, third])
        .unwrap()
        .unwrap();
    assert_eq!(
        config.service(Service::Aiserve).unwrap().api_key.as_deref(),
        Some("from-second")
    );
}

#[test]
fn test_first_existing_path_none_found() {
    let dir = tempdir().unwrap();
    let result = ConfigStore::load_from_first_existing_path(&[
        dir.path().join("a.yaml"),
        dir.path().join("b.yml"),
    ])
    .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_first_existing_path_propagates_errors() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.yaml");
    let good = dir.path().join("good.yaml");
    fs::write(&empty, "").unwrap();
    fs::write(&good, "darkship: {api_key: k}\n").unwrap();

    let err = ConfigStore::load_from_first_existing_path(&[empty, good]).unwrap_err();
    assert!(matches!(err, ConfigError::Empty { .. }));
}

#[test]
fn test_save_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let config = ResolvedConfig::new()
        .with_service(Service::Hostscience, ServiceConfig::with_api_key("hs"))
        .with_shared_account(SharedAccount::with_api_key("master"))
        .with_settings(GlobalSettings {
            timeout: 60,
            verify_tls: true,
        });

    ConfigStore::save(&config, &path).unwrap();
    let store = ConfigStore::open(&path).unwrap();

    assert_eq!(store.config(), &config);
    assert_eq!(store.source_path(), Some(path.as_path()));
}

#[test]
fn test_write_template_refuses_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aftership.yaml");

    ConfigStore::write_template(&path, TemplateKind::Minimal, false).unwrap();
    let err = ConfigStore::write_template(&path, TemplateKind::Full, false).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigExists { .. }));

    ConfigStore::write_template(&path, TemplateKind::Full, true).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("# darkship:"));
    assert!(ConfigStore::open(&path).is_ok());
}

#[test]
#[serial]
fn test_process_env_scenario_precedence() {
    clean_env();
    env::set_var("DARKSHIP_API_KEY", "env-darkship");
    env::set_var("AISERVE_API_KEY", "env-aiserve");
    env::set_var("DARKSTORAGE_BASE_URL", "https://env.darkstorage.io");

    let config = ResolvedConfig::new()
        .with_service(Service::Darkship, ServiceConfig::with_api_key("dk1"))
        .with_shared_account(SharedAccount::with_api_key("master"));
    let resolver = CredentialResolver::new();

    assert_eq!(
        resolver.resolve_api_key(Service::Darkship, &config).as_deref(),
        Some("dk1")
    );
    assert_eq!(
        resolver.resolve_api_key(Service::Aiserve, &config).as_deref(),
        Some("master")
    );
    assert_eq!(
        resolver.resolve_base_url(Service::Darkstorage, &config, "https://default"),
        "https://env.darkstorage.io"
    );

    let resolved = resolver.resolve(Service::Aiserve, &ResolvedConfig::new()).unwrap();
    assert_eq!(resolved.api_key, "env-aiserve");
    assert_eq!(resolved.base_url, "https://api.aiserve.farm");

    clean_env();
}

#[test]
#[serial]
fn test_file_base_url_beats_env_base_url() {
    clean_env();
    env::set_var("SHIPSHACK_BASE_URL", "https://env.shipshack.io");

    let dir = tempdir().unwrap();
    let path = dir.path().join("aftership.yaml");
    fs::write(&path, "shipshack:\n  base_url: https://file.shipshack.io\n").unwrap();

    let config = ConfigStore::load_from_path(&path).unwrap();
    let url = CredentialResolver::new().resolve_base_url(
        Service::Shipshack,
        &config,
        Service::Shipshack.default_base_url(),
    );
    assert_eq!(url, "https://file.shipshack.io");

    clean_env();
}
