//! Configuration data model.
//!
//! A [`ResolvedConfig`] is the fully materialized content of one config
//! document: per-service overrides, an optional shared AfterDark account and
//! the global settings. It is built once at startup and read-only afterward.
//!
//! The on-disk shape of these types is owned by [`crate::store`].

use crate::service::Service;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-service override. Absent fields mean "not overridden".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// API key used for this service only.
    pub api_key: Option<String>,

    /// Custom base URL for this service.
    pub base_url: Option<String>,
}

impl ServiceConfig {
    /// Override carrying only an API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: None,
        }
    }

    /// Override carrying only a base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: Some(base_url.into()),
        }
    }

    /// Set the base URL on an existing override.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// True when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.base_url.is_none()
    }
}

/// AfterDark Systems account: one credential bundle that backs every
/// service lacking its own override.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SharedAccount {
    /// Account username.
    pub username: Option<String>,

    /// Account password.
    pub password: Option<String>,

    /// Account-wide API key.
    pub api_key: Option<String>,

    /// Account identifier.
    pub account_id: Option<String>,
}

impl SharedAccount {
    /// Account carrying only an API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

impl fmt::Debug for SharedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAccount")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Cross-cutting settings applied to every service session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalSettings {
    /// Request timeout in seconds. Zero disables the session-wide timeout;
    /// config files must give a positive value.
    pub timeout: u64,

    /// Whether to verify TLS certificates (disable only for testing).
    pub verify_tls: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }
}

impl GlobalSettings {
    /// Get the request timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Fully materialized configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Per-service overrides. Services without an entry are not overridden.
    pub services: BTreeMap<Service, ServiceConfig>,

    /// Shared AfterDark account, if configured.
    pub shared_account: Option<SharedAccount>,

    /// Global settings.
    pub settings: GlobalSettings,
}

impl ResolvedConfig {
    /// Create an empty configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the override block for a service.
    pub fn service(&self, service: Service) -> Option<&ServiceConfig> {
        self.services.get(&service)
    }

    /// Add or replace a service override. Empty overrides are dropped.
    pub fn with_service(mut self, service: Service, config: ServiceConfig) -> Self {
        if config.is_empty() {
            self.services.remove(&service);
        } else {
            self.services.insert(service, config);
        }
        self
    }

    /// Set the shared account.
    pub fn with_shared_account(mut self, account: SharedAccount) -> Self {
        self.shared_account = Some(account);
        self
    }

    /// Set the global settings.
    pub fn with_settings(mut self, settings: GlobalSettings) -> Self {
        self.settings = settings;
        self
    }
}
