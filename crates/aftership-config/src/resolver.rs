//! Credential and base URL resolution.
//!
//! Picks one effective API key and one effective base URL per service from
//! the layered sources, first hit wins:
//!
//! ```text
//! api_key:  service override -> shared account -> <SERVICE>_API_KEY
//! base_url: service override -> <SERVICE>_BASE_URL -> compiled-in default
//! ```
//!
//! The two fields resolve independently, so a service can take its URL from
//! its own block and its key from the shared account.
//!
//! ## Usage
//!
//! ```rust
//! use aftership_config::{CredentialResolver, ResolvedConfig, Service, SharedAccount};
//! use std::collections::HashMap;
//!
//! let config = ResolvedConfig::new().with_shared_account(SharedAccount::with_api_key("master"));
//! let resolver = CredentialResolver::with_env(HashMap::<String, String>::new());
//!
//! assert_eq!(
//!     resolver.resolve_api_key(Service::Darkstorage, &config).as_deref(),
//!     Some("master")
//! );
//! ```

use crate::service::Service;
use crate::settings::ResolvedConfig;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Source of environment variables.
///
/// Empty values are treated the same as unset variables.
pub trait EnvSource {
    /// Look up a variable.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Where a resolved API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The service's own config block.
    ServiceOverride,
    /// The shared AfterDark account.
    SharedAccount,
    /// `<SERVICE>_API_KEY`.
    Environment,
}

impl KeySource {
    /// Get the string representation of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::ServiceOverride => "service_override",
            KeySource::SharedAccount => "shared_account",
            KeySource::Environment => "environment",
        }
    }
}

/// Effective credentials for one service.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    /// Service the credentials belong to.
    pub service: Service,
    /// Effective API key.
    pub api_key: String,
    /// Effective base URL.
    pub base_url: String,
    /// Which tier supplied the key.
    pub key_source: KeySource,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("service", &self.service)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("key_source", &self.key_source)
            .finish()
    }
}

/// Resolves API keys and base URLs from a [`ResolvedConfig`] and the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver<E = ProcessEnv> {
    env: E,
}

impl CredentialResolver<ProcessEnv> {
    /// Resolver backed by the process environment.
    pub fn new() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: EnvSource> CredentialResolver<E> {
    /// Resolver backed by a custom environment source.
    pub fn with_env(env: E) -> Self {
        Self { env }
    }

    /// Resolve the API key for a service.
    ///
    /// Returns `None` when no tier yields a non-empty key; the caller must
    /// then treat the service as unconfigured.
    pub fn resolve_api_key(&self, service: Service, config: &ResolvedConfig) -> Option<String> {
        self.resolve_api_key_with_source(service, config)
            .map(|(key, _)| key)
    }

    /// Resolve the base URL for a service. Never fails.
    ///
    /// The shared account has no URL tier.
    pub fn resolve_base_url(
        &self,
        service: Service,
        config: &ResolvedConfig,
        default: &str,
    ) -> String {
        if let Some(url) = config
            .service(service)
            .and_then(|c| non_empty(c.base_url.as_deref()))
        {
            return url.to_string();
        }

        if let Some(url) = self.env_value(service.base_url_env_var()) {
            debug!(service = %service, "Base URL taken from {}", service.base_url_env_var());
            return url;
        }

        default.to_string()
    }

    /// Resolve both fields, using the service's compiled-in default URL.
    pub fn resolve(&self, service: Service, config: &ResolvedConfig) -> Option<ResolvedCredentials> {
        let (api_key, key_source) = self.resolve_api_key_with_source(service, config)?;
        let base_url = self.resolve_base_url(service, config, service.default_base_url());

        debug!(
            service = %service,
            key_source = key_source.as_str(),
            base_url = %base_url,
            "Resolved credentials"
        );

        Some(ResolvedCredentials {
            service,
            api_key,
            base_url,
            key_source,
        })
    }

    fn resolve_api_key_with_source(
        &self,
        service: Service,
        config: &ResolvedConfig,
    ) -> Option<(String, KeySource)> {
        if let Some(key) = config
            .service(service)
            .and_then(|c| non_empty(c.api_key.as_deref()))
        {
            return Some((key.to_string(), KeySource::ServiceOverride));
        }

        if let Some(key) = config
            .shared_account
            .as_ref()
            .and_then(|a| non_empty(a.api_key.as_deref()))
        {
            return Some((key.to_string(), KeySource::SharedAccount));
        }

        self.env_value(service.api_key_env_var())
            .map(|key| (key, KeySource::Environment))
    }

    fn env_value(&self, name: &str) -> Option<String> {
        self.env.var(name).filter(|v| !v.is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
