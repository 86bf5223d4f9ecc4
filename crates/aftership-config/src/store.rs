//! Config document loading and saving.
//!
//! The on-disk format is a YAML document with one optional block per service,
//! an optional `afterdark_account` block and an optional `settings` block:
//!
//! ```yaml
//! afterdark_account:
//!   api_key: master-key
//! darkstorage:
//!   base_url: https://custom.darkstorage.io
//! settings:
//!   timeout: 30
//!   verify_ssl: true
//! ```
//!
//! Unknown top-level keys are ignored so older clients can read newer files.

use crate::error::{ConfigError, ConfigResult};
use crate::service::Service;
use crate::settings::{GlobalSettings, ResolvedConfig, ServiceConfig, SharedAccount};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level key of the shared account block.
pub const SHARED_ACCOUNT_KEY: &str = "afterdark_account";

/// Top-level key of the global settings block.
pub const SETTINGS_KEY: &str = "settings";

/// Starter document kinds written by [`ConfigStore::write_template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Shared account and settings only.
    Minimal,
    /// Shared account, commented service overrides and settings.
    Full,
}

const MINIMAL_TEMPLATE: &str = "\
# Aftership configuration
afterdark_account:
  api_key: your-afterdark-api-key

settings:
  timeout: 30
  verify_ssl: true
";

const FULL_TEMPLATE: &str = "\
# Aftership configuration
afterdark_account:
  username: your-username
  api_key: your-afterdark-api-key
  account_id: your-account-id

# Individual service overrides (optional)
# darkship:
#   api_key: service-specific-key
#   base_url: https://api.darkship.io

# darkstorage:
#   api_key: service-specific-key
#   base_url: https://api.darkstorage.io

# shipshack:
#   api_key: service-specific-key
#   base_url: https://api.shipshack.io

# models2go:
#   api_key: service-specific-key
#   base_url: https://api.models2go.com

# hostscience:
#   api_key: service-specific-key
#   base_url: https://api.hostscience.io

# aiserve:
#   api_key: service-specific-key
#   base_url: https://api.aiserve.farm

settings:
  timeout: 30
  verify_ssl: true
";

/// A loaded configuration together with the file it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    config: ResolvedConfig,
    source: Option<PathBuf>,
}

impl ConfigStore {
    /// Wrap an in-memory configuration.
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    /// Load the config file at `path`.
    pub fn open(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = expand_home(path.as_ref());
        let config = Self::load_from_path(&path)?;
        Ok(Self {
            config,
            source: Some(path),
        })
    }

    /// Load the first config file found in the default locations.
    pub fn discover() -> ConfigResult<Option<Self>> {
        for path in Self::default_search_paths() {
            if path.exists() {
                return Self::open(path).map(Some);
            }
        }
        Ok(None)
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Consume the store, returning the configuration.
    pub fn into_config(self) -> ResolvedConfig {
        self.config
    }

    /// File the configuration was read from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Look up a service override by service name.
    pub fn service_by_name(&self, name: &str) -> ConfigResult<Option<&ServiceConfig>> {
        let service: Service = name.parse()?;
        Ok(self.config.service(service))
    }

    /// Build a configuration from an already-parsed document.
    ///
    /// YAML merge keys (`<<: *anchor`) are applied before the blocks are read.
    pub fn load_from_mapping(raw: &Mapping) -> ConfigResult<ResolvedConfig> {
        let raw = merged(raw)?;
        let mut config = ResolvedConfig::default();

        for (key, value) in &raw {
            let Some(key) = key.as_str() else {
                debug!("Ignoring non-string top-level config key");
                continue;
            };

            if let Some(service) = Service::parse(key).filter(|s| s.as_str() == key) {
                let block = service_block(service, value)?;
                if !block.is_empty() {
                    config.services.insert(service, block);
                }
            } else if key == SHARED_ACCOUNT_KEY {
                config.shared_account = Some(shared_account_block(value)?);
            } else if key == SETTINGS_KEY {
                config.settings = settings_block(value)?;
            } else {
                debug!(key, "Ignoring unknown top-level config key");
            }
        }

        Ok(config)
    }

    /// Convert a configuration back into a document.
    ///
    /// Only populated fields are written; `settings` is always present.
    pub fn to_mapping(config: &ResolvedConfig) -> Mapping {
        let mut out = Mapping::new();

        for service in Service::ALL {
            let Some(block) = config.service(service).filter(|b| !b.is_empty()) else {
                continue;
            };
            let mut map = Mapping::new();
            insert_opt(&mut map, "api_key", &block.api_key);
            insert_opt(&mut map, "base_url", &block.base_url);
            out.insert(Value::from(service.as_str()), Value::Mapping(map));
        }

        if let Some(account) = &config.shared_account {
            let mut map = Mapping::new();
            insert_opt(&mut map, "username", &account.username);
            insert_opt(&mut map, "password", &account.password);
            insert_opt(&mut map, "api_key", &account.api_key);
            insert_opt(&mut map, "account_id", &account.account_id);
            out.insert(Value::from(SHARED_ACCOUNT_KEY), Value::Mapping(map));
        }

        let mut settings = Mapping::new();
        settings.insert(Value::from("timeout"), Value::from(config.settings.timeout));
        settings.insert(
            Value::from("verify_ssl"),
            Value::from(config.settings.verify_tls),
        );
        out.insert(Value::from(SETTINGS_KEY), Value::Mapping(settings));

        out
    }

    /// Load and interpret a YAML config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<ResolvedConfig> {
        let path = expand_home(path.as_ref());

        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        if is_blank_document(&content) {
            return Err(ConfigError::Empty { path });
        }

        let document: Value = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::yaml(Some(path.clone()), e))?;

        let mapping = match document {
            Value::Null => return Err(ConfigError::Empty { path }),
            Value::Mapping(m) if m.is_empty() => return Err(ConfigError::Empty { path }),
            Value::Mapping(m) => m,
            other => {
                return Err(ConfigError::malformed(format!(
                    "expected a mapping at top level, found {}",
                    kind(&other)
                ))
                .at_path(&path))
            }
        };

        let config = Self::load_from_mapping(&mapping).map_err(|e| e.at_path(&path))?;
        info!(path = %path.display(), "Loaded aftership config");
        Ok(config)
    }

    /// Load the first candidate path that exists.
    ///
    /// Returns `Ok(None)` when none of them exist. Errors from the first
    /// existing file are propagated, not skipped.
    pub fn load_from_first_existing_path<P: AsRef<Path>>(
        candidates: &[P],
    ) -> ConfigResult<Option<ResolvedConfig>> {
        for candidate in candidates {
            let path = expand_home(candidate.as_ref());
            if path.exists() {
                return Self::load_from_path(&path).map(Some);
            }
            debug!(path = %path.display(), "Config candidate not present");
        }
        Ok(None)
    }

    /// Default config locations, in search order.
    ///
    /// 1. `./aftership.yaml`, `./aftership.yml`
    /// 2. `~/.aftership/config.yaml`, `~/.aftership/config.yml`
    /// 3. `~/.config/aftership/config.yaml`, `~/.config/aftership/config.yml`
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("aftership.yaml"),
            PathBuf::from("aftership.yml"),
        ];

        if let Some(home) = dirs::home_dir() {
            let dot_dir = home.join(".aftership");
            let xdg_dir = home.join(".config").join("aftership");
            paths.push(dot_dir.join("config.yaml"));
            paths.push(dot_dir.join("config.yml"));
            paths.push(xdg_dir.join("config.yaml"));
            paths.push(xdg_dir.join("config.yml"));
        }

        paths
    }

    /// Write a configuration to `path` as YAML.
    pub fn save(config: &ResolvedConfig, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = expand_home(path.as_ref());
        let yaml = serde_yaml::to_string(&Value::Mapping(Self::to_mapping(config)))?;
        write_file(&path, &yaml)?;
        info!(path = %path.display(), "Saved aftership config");
        Ok(())
    }

    /// Starter config document.
    pub fn template(kind: TemplateKind) -> &'static str {
        match kind {
            TemplateKind::Minimal => MINIMAL_TEMPLATE,
            TemplateKind::Full => FULL_TEMPLATE,
        }
    }

    /// Write a starter config document to `path`.
    ///
    /// Fails with [`ConfigError::ConfigExists`] if the file exists and
    /// `overwrite` is false.
    pub fn write_template(
        path: impl AsRef<Path>,
        kind: TemplateKind,
        overwrite: bool,
    ) -> ConfigResult<PathBuf> {
        let path = expand_home(path.as_ref());
        if path.exists() && !overwrite {
            return Err(ConfigError::ConfigExists { path });
        }
        write_file(&path, Self::template(kind))?;
        info!(path = %path.display(), "Created config file");
        Ok(path)
    }
}

fn write_file(path: &Path, content: &str) -> ConfigResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Resolve `<<` merge keys anywhere in the document.
fn merged(raw: &Mapping) -> ConfigResult<Mapping> {
    let mut document = Value::Mapping(raw.clone());
    document
        .apply_merge()
        .map_err(|e| ConfigError::yaml(None, e))?;
    match document {
        Value::Mapping(m) => Ok(m),
        other => Err(ConfigError::malformed(format!(
            "expected a mapping at top level, found {}",
            kind(&other)
        ))),
    }
}

/// Whitespace, comments and document markers only.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn service_block(service: Service, value: &Value) -> ConfigResult<ServiceConfig> {
    let Some(map) = block_mapping(service.as_str(), value)? else {
        return Ok(ServiceConfig::default());
    };
    let field = |name: &str| string_field(service.as_str(), map, name);
    Ok(ServiceConfig {
        api_key: field("api_key")?,
        base_url: field("base_url")?,
    })
}

fn shared_account_block(value: &Value) -> ConfigResult<SharedAccount> {
    let Some(map) = block_mapping(SHARED_ACCOUNT_KEY, value)? else {
        return Ok(SharedAccount::default());
    };
    let field = |name: &str| string_field(SHARED_ACCOUNT_KEY, map, name);
    Ok(SharedAccount {
        username: field("username")?,
        password: field("password")?,
        api_key: field("api_key")?,
        account_id: field("account_id")?,
    })
}

fn settings_block(value: &Value) -> ConfigResult<GlobalSettings> {
    let mut settings = GlobalSettings::default();
    let Some(map) = block_mapping(SETTINGS_KEY, value)? else {
        return Ok(settings);
    };

    match map.get("timeout") {
        None | Some(Value::Null) => {}
        Some(v) => {
            settings.timeout = v.as_u64().filter(|&t| t > 0).ok_or_else(|| {
                ConfigError::malformed(format!(
                    "settings.timeout must be a positive number of seconds, found {}",
                    describe(v)
                ))
            })?;
        }
    }

    match map.get("verify_ssl") {
        None | Some(Value::Null) => {}
        Some(v) => {
            settings.verify_tls = v.as_bool().ok_or_else(|| {
                ConfigError::malformed(format!(
                    "settings.verify_ssl must be a boolean, found {}",
                    kind(v)
                ))
            })?;
        }
    }

    Ok(settings)
}

/// A block must be a mapping or null.
fn block_mapping<'a>(block: &str, value: &'a Value) -> ConfigResult<Option<&'a Mapping>> {
    match value {
        Value::Null => Ok(None),
        Value::Mapping(m) => Ok(Some(m)),
        other => Err(ConfigError::malformed(format!(
            "{} must be a mapping, found {}",
            block,
            kind(other)
        ))),
    }
}

/// Read a scalar sub-field as a string. Numbers and booleans are stringified.
fn string_field(block: &str, map: &Mapping, name: &str) -> ConfigResult<Option<String>> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(ConfigError::malformed(format!(
            "{}.{} must be a scalar, found {}",
            block,
            name,
            kind(other)
        ))),
    }
}

fn insert_opt(map: &mut Mapping, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(Value::from(key), Value::from(v.as_str()));
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => kind(other).to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
