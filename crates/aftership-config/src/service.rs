//! The closed set of aftership services.
//!
//! Each service is addressed by a fixed identity. Everything that differs
//! between services (config key, environment variable names, default origin,
//! auth header) lives in the constant table behind [`Service`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// One of the six services reachable through the meta client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// darkship.io: shipping operations.
    Darkship,
    /// darkstorage.io: S3-compatible storage.
    Darkstorage,
    /// shipshack.io: fleet management.
    Shipshack,
    /// models2go.com: model publishing and management.
    Models2Go,
    /// hostscience.io: hosting infrastructure.
    Hostscience,
    /// aiserve.farm: AI compute management.
    Aiserve,
}

impl Service {
    /// All services, in canonical order.
    pub const ALL: [Service; 6] = [
        Service::Darkship,
        Service::Darkstorage,
        Service::Shipshack,
        Service::Models2Go,
        Service::Hostscience,
        Service::Aiserve,
    ];

    /// Get the string representation of the service.
    ///
    /// This is also the top-level key of the service's block in a config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Darkship => "darkship",
            Service::Darkstorage => "darkstorage",
            Service::Shipshack => "shipshack",
            Service::Models2Go => "models2go",
            Service::Hostscience => "hostscience",
            Service::Aiserve => "aiserve",
        }
    }

    /// Parse service from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "darkship" => Some(Service::Darkship),
            "darkstorage" => Some(Service::Darkstorage),
            "shipshack" => Some(Service::Shipshack),
            "models2go" => Some(Service::Models2Go),
            "hostscience" => Some(Service::Hostscience),
            "aiserve" => Some(Service::Aiserve),
            _ => None,
        }
    }

    /// Public domain of the service, used in log and error output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Darkship => "darkship.io",
            Service::Darkstorage => "darkstorage.io",
            Service::Shipshack => "shipshack.io",
            Service::Models2Go => "models2go.com",
            Service::Hostscience => "hostscience.io",
            Service::Aiserve => "aiserve.farm",
        }
    }

    /// Compiled-in base URL, the last resort of base URL resolution.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Service::Darkship => "https://api.darkship.io",
            Service::Darkstorage => "https://api.darkstorage.io",
            Service::Shipshack => "https://api.shipshack.io",
            Service::Models2Go => "https://api.models2go.com",
            Service::Hostscience => "https://api.hostscience.io",
            Service::Aiserve => "https://api.aiserve.farm",
        }
    }

    /// Environment variable holding the API key (e.g. `DARKSHIP_API_KEY`).
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Service::Darkship => "DARKSHIP_API_KEY",
            Service::Darkstorage => "DARKSTORAGE_API_KEY",
            Service::Shipshack => "SHIPSHACK_API_KEY",
            Service::Models2Go => "MODELS2GO_API_KEY",
            Service::Hostscience => "HOSTSCIENCE_API_KEY",
            Service::Aiserve => "AISERVE_API_KEY",
        }
    }

    /// Environment variable holding a base URL override (e.g. `DARKSHIP_BASE_URL`).
    pub fn base_url_env_var(&self) -> &'static str {
        match self {
            Service::Darkship => "DARKSHIP_BASE_URL",
            Service::Darkstorage => "DARKSTORAGE_BASE_URL",
            Service::Shipshack => "SHIPSHACK_BASE_URL",
            Service::Models2Go => "MODELS2GO_BASE_URL",
            Service::Hostscience => "HOSTSCIENCE_BASE_URL",
            Service::Aiserve => "AISERVE_BASE_URL",
        }
    }

    /// Name of the explicit construction argument for this service's key.
    pub fn api_key_argument(&self) -> &'static str {
        match self {
            Service::Darkship => "darkship_api_key",
            Service::Darkstorage => "darkstorage_api_key",
            Service::Shipshack => "shipshack_api_key",
            Service::Models2Go => "models2go_api_key",
            Service::Hostscience => "hostscience_api_key",
            Service::Aiserve => "aiserve_api_key",
        }
    }

    /// Header name the API key is sent under.
    pub fn api_key_header(&self) -> &'static str {
        API_KEY_HEADER
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::parse(s).ok_or_else(|| ConfigError::UnknownService(s.to_string()))
    }
}
