//! Tests for the file and process-environment construction paths.

use aftership_client::{ClientError, ConfigError, MetaClient, Service};
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
#[serial]
fn test_from_config_file_scenarios() {
    clean_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("aftership.yaml");
    fs::write(
        &path,
        r#"
afterdark_account:
  api_key: master-key
darkship:
  api_key: darkship-specific-key
darkstorage:
  base_url: https://custom.darkstorage.io
settings:
  timeout: 45
  verify_ssl: true
"#,
    )
    .unwrap();

    let client = MetaClient::from_config_file(&path).unwrap();

    assert_eq!(client.len(), 6);
    assert_eq!(client.settings().timeout, 45);
    assert_eq!(client.darkship().unwrap().api_key(), "darkship-specific-key");

    let darkstorage = client.darkstorage().unwrap();
    assert_eq!(darkstorage.api_key(), "master-key");
    assert_eq!(darkstorage.base_url(), "https://custom.darkstorage.io");

    let shipshack = client.shipshack().unwrap();
    assert_eq!(shipshack.api_key(), "master-key");
    assert_eq!(shipshack.base_url(), "https://api.shipshack.io");
}

#[test]
#[serial]
fn test_from_config_file_missing() {
    let dir = tempdir().unwrap();
    let err = MetaClient::from_config_file(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Config(ConfigError::NotFound { .. })
    ));
}

#[test]
#[serial]
fn test_load_with_explicit_path_must_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        MetaClient::load(Some(missing.as_path())),
        Err(ClientError::Config(ConfigError::NotFound { .. }))
    ));
}

#[test]
#[serial]
fn test_env_key_fills_gap_in_config_file() {
    clean_env();
    env::set_var("HOSTSCIENCE_API_KEY", "env-hs");
    env::set_var("HOSTSCIENCE_BASE_URL", "https://env.hostscience.io");

    let dir = tempdir().unwrap();
    let path = dir.path().join("aftership.yaml");
    fs::write(&path, "darkship:\n  api_key: dk1\n").unwrap();

    let client = MetaClient::from_config_file(&path).unwrap();
    assert_eq!(
        client.configured_services(),
        vec![Service::Darkship, Service::Hostscience]
    );
    let hostscience = client.hostscience().unwrap();
    assert_eq!(hostscience.api_key(), "env-hs");
    assert_eq!(hostscience.base_url(), "https://env.hostscience.io");

    clean_env();
}

#[test]
#[serial]
fn test_from_env_process() {
    clean_env();
    env::set_var("SHIPSHACK_API_KEY", "ss");
    env::set_var("MODELS2GO_BASE_URL", "https://unused.models2go.com");

    let client = MetaClient::from_env().unwrap();
    assert_eq!(client.configured_services(), vec![Service::Shipshack]);
    assert!(matches!(
        client.models2go(),
        Err(ClientError::ServiceNotConfigured { .. })
    ));

    clean_env();
}

#[test]
#[serial]
fn test_from_dotenv_file() {
    clean_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(
        &path,
        "DARKSHIP_API_KEY=dotenv-key\nDARKSHIP_BASE_URL=http://localhost:4010\n",
    )
    .unwrap();

    let client = MetaClient::from_dotenv(Some(path.as_path())).unwrap();
    let darkship = client.darkship().unwrap();
    assert_eq!(darkship.api_key(), "dotenv-key");
    assert_eq!(darkship.base_url(), "http://localhost:4010");

    clean_env();
}

#[test]
#[serial]
fn test_from_dotenv_missing_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join(".env.missing");
    let err = MetaClient::from_dotenv(Some(missing.as_path())).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Config(ConfigError::NotFound { .. })
    ));
}

#[test]
#[serial]
fn test_not_configured_propagates_through_question_mark() {
    clean_env();

    fn use_client() -> Result<(), ClientError> {
        let client = MetaClient::builder()
            .api_key(Service::Darkship, "x")
            .build()?;
        client.darkship()?;
        client.aiserve()?;
        Ok(())
    }

    let err = use_client().unwrap_err();
    assert!(matches!(
        err,
        ClientError::ServiceNotConfigured {
            service: Service::Aiserve,
            ..
        }
    ));
}
