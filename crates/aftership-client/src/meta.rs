//! Meta client.
//!
//! [`MetaClient`] owns at most one [`ServiceHandle`] per service. A handle
//! exists exactly when an API key was supplied or resolved for that service;
//! asking for any other service fails with
//! [`ClientError::ServiceNotConfigured`].
//!
//! Construction never touches the network. Dropping the client closes every
//! session, so sessions are released on every exit path including early
//! returns through `?`.

use crate::error::{ClientError, ClientResult};
use crate::handle::ServiceHandle;
use aftership_config::{
    ConfigStore, CredentialResolver, EnvSource, GlobalSettings, ProcessEnv, ResolvedConfig,
    Service,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Explicit construction arguments.
///
/// Services without a non-empty API key are left out of the client.
#[derive(Clone, Default)]
pub struct ClientOptions {
    api_keys: HashMap<Service, String>,
    base_urls: HashMap<Service, String>,
    settings: GlobalSettings,
}

impl ClientOptions {
    /// Empty options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key for a service.
    pub fn api_key(mut self, service: Service, key: impl Into<String>) -> Self {
        self.api_keys.insert(service, key.into());
        self
    }

    /// Set a custom base URL for a service.
    pub fn base_url(mut self, service: Service, url: impl Into<String>) -> Self {
        self.base_urls.insert(service, url.into());
        self
    }

    /// Set the API key only when one is given.
    pub fn api_key_opt(self, service: Service, key: Option<String>) -> Self {
        match key {
            Some(key) => self.api_key(service, key),
            None => self,
        }
    }

    /// Set the base URL only when one is given.
    pub fn base_url_opt(self, service: Service, url: Option<String>) -> Self {
        match url {
            Some(url) => self.base_url(service, url),
            None => self,
        }
    }

    /// Set the global settings used by every session.
    pub fn settings(mut self, settings: GlobalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<MetaClient> {
        MetaClient::build(self)
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keyed: Vec<_> = self.api_keys.keys().map(Service::as_str).collect();
        keyed.sort_unstable();
        f.debug_struct("ClientOptions")
            .field("api_keys_for", &keyed)
            .field("base_urls", &self.base_urls)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Unified client for the six aftership services.
#[derive(Debug)]
pub struct MetaClient {
    handles: BTreeMap<Service, ServiceHandle>,
    settings: GlobalSettings,
}

impl MetaClient {
    /// Start building a client from explicit arguments.
    pub fn builder() -> ClientOptions {
        ClientOptions::new()
    }

    /// Build from explicit arguments.
    ///
    /// Each service with a non-empty key gets a handle using the explicit
    /// base URL if given, otherwise the built-in default. No environment or
    /// file lookup happens here.
    pub fn build(options: ClientOptions) -> ClientResult<Self> {
        let mut handles = BTreeMap::new();

        for service in Service::ALL {
            let Some(key) = options.api_keys.get(&service).filter(|k| !k.is_empty()) else {
                continue;
            };
            let base_url = options
                .base_urls
                .get(&service)
                .filter(|u| !u.is_empty())
                .map(String::as_str)
                .unwrap_or_else(|| service.default_base_url());

            let handle = ServiceHandle::new(service, key.as_str(), base_url, &options.settings)?;
            handles.insert(service, handle);
        }

        Ok(Self::assemble(handles, options.settings))
    }

    /// Build from a loaded configuration, reading the process environment
    /// for the lower resolution tiers.
    pub fn build_from_config(config: &ResolvedConfig) -> ClientResult<Self> {
        Self::build_from_config_with_env(config, ProcessEnv)
    }

    /// Build from a loaded configuration with a custom environment source.
    pub fn build_from_config_with_env<E: EnvSource>(
        config: &ResolvedConfig,
        env: E,
    ) -> ClientResult<Self> {
        let resolver = CredentialResolver::with_env(env);
        let mut handles = BTreeMap::new();

        for service in Service::ALL {
            let Some(creds) = resolver.resolve(service, config) else {
                debug!(service = %service, "No API key resolved, leaving service unconfigured");
                continue;
            };
            let handle =
                ServiceHandle::new(service, creds.api_key, creds.base_url, &config.settings)?;
            handles.insert(service, handle);
        }

        Ok(Self::assemble(handles, config.settings))
    }

    /// Build from `<SERVICE>_API_KEY` and `<SERVICE>_BASE_URL`.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_env_with(ProcessEnv)
    }

    /// Build from a custom environment source.
    pub fn from_env_with<E: EnvSource>(env: E) -> ClientResult<Self> {
        let mut options = ClientOptions::new();
        for service in Service::ALL {
            options = options
                .api_key_opt(service, env.var(service.api_key_env_var()))
                .base_url_opt(service, env.var(service.base_url_env_var()));
        }
        Self::build(options)
    }

    /// Load a `.env` file into the process environment, then build from it.
    ///
    /// Without a path, `.env` is searched for from the working directory
    /// upward; a missing file is not an error. Variables already set in the
    /// process environment are kept.
    pub fn from_dotenv(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| dotenv_error(path, e))?;
                debug!(path = %path.display(), "Loaded .env file");
            }
            None => {
                if let Ok(found) = dotenvy::dotenv() {
                    debug!(path = %found.display(), "Loaded .env file");
                }
            }
        }
        Self::from_env()
    }

    /// Build from an explicit config file.
    pub fn from_config_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let config = ConfigStore::load_from_path(path)?;
        Self::build_from_config(&config)
    }

    /// Build from the best available source.
    ///
    /// An explicit path must exist. Without one, the default locations are
    /// searched; if none exists the client is built from the environment
    /// alone.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        if let Some(path) = path {
            return Self::from_config_file(path);
        }

        let config = match ConfigStore::discover()? {
            Some(store) => store.into_config(),
            None => {
                debug!("No config file found, resolving from environment");
                ResolvedConfig::default()
            }
        };
        Self::build_from_config(&config)
    }

    fn assemble(handles: BTreeMap<Service, ServiceHandle>, settings: GlobalSettings) -> Self {
        info!(
            services = ?handles.keys().map(Service::as_str).collect::<Vec<_>>(),
            "Initialized aftership client"
        );
        Self { handles, settings }
    }

    /// Handle for a service.
    pub fn get(&self, service: Service) -> ClientResult<&ServiceHandle> {
        self.handles
            .get(&service)
            .ok_or_else(|| ClientError::not_configured(service))
    }

    /// Handle for a service, looked up by name.
    pub fn get_by_name(&self, name: &str) -> ClientResult<&ServiceHandle> {
        let service: Service = name.parse()?;
        self.get(service)
    }

    /// darkship.io handle.
    pub fn darkship(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Darkship)
    }

    /// darkstorage.io handle.
    pub fn darkstorage(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Darkstorage)
    }

    /// shipshack.io handle.
    pub fn shipshack(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Shipshack)
    }

    /// models2go.com handle.
    pub fn models2go(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Models2Go)
    }

    /// hostscience.io handle.
    pub fn hostscience(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Hostscience)
    }

    /// aiserve.farm handle.
    pub fn aiserve(&self) -> ClientResult<&ServiceHandle> {
        self.get(Service::Aiserve)
    }

    /// Whether a handle exists for the service.
    pub fn is_configured(&self, service: Service) -> bool {
        self.handles.contains_key(&service)
    }

    /// Configured services, in canonical order.
    pub fn configured_services(&self) -> Vec<Service> {
        self.handles.keys().copied().collect()
    }

    /// Number of handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when no service is configured.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Settings shared by every session.
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Close every session. Calling this again is a no-op.
    pub fn close_all(&mut self) {
        for handle in self.handles.values_mut() {
            handle.close();
        }
    }

    /// True when every handle is closed (vacuously true with no handles).
    pub fn is_closed(&self) -> bool {
        self.handles.values().all(ServiceHandle::is_closed)
    }
}

impl Drop for MetaClient {
    fn drop(&mut self) {
        self.close_all();
    }
}

fn dotenv_error(path: &Path, error: dotenvy::Error) -> ClientError {
    use aftership_config::ConfigError;

    match error {
        dotenvy::Error::Io(source) if source.kind() == std::io::ErrorKind::NotFound => {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
            .into()
        }
        dotenvy::Error::Io(source) => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into(),
        other => ConfigError::Malformed {
            path: Some(path.to_path_buf()),
            message: other.to_string(),
            source: None,
        }
        .into(),
    }
}
