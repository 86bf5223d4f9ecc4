//! # Aftership Config
//!
//! This crate resolves which API key and base URL apply to each aftership
//! service, given explicit config files, a shared AfterDark account and the
//! process environment.
//!
//! ## Overview
//!
//! The aftership-config crate handles:
//! - **Services**: The closed set of six services and their constants
//! - **Data model**: Per-service overrides, shared account, global settings
//! - **ConfigStore**: Loading, discovering and saving YAML config documents
//! - **CredentialResolver**: Precedence rules for keys and base URLs
//!
//! ## Precedence
//!
//! ```text
//! api_key:  <service>.api_key -> afterdark_account.api_key -> <SERVICE>_API_KEY
//! base_url: <service>.base_url -> <SERVICE>_BASE_URL -> built-in default
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aftership_config::{ConfigStore, CredentialResolver, Service};
//!
//! fn example() -> Result<(), aftership_config::ConfigError> {
//!     let config = ConfigStore::discover()?
//!         .map(ConfigStore::into_config)
//!         .unwrap_or_default();
//!
//!     let resolver = CredentialResolver::new();
//!     if let Some(creds) = resolver.resolve(Service::Darkship, &config) {
//!         println!("darkship -> {}", creds.base_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod store;

// Re-export main types for convenience
pub use error::{ConfigError, ConfigResult};
pub use resolver::{CredentialResolver, EnvSource, KeySource, ProcessEnv, ResolvedCredentials};
pub use service::{Service, API_KEY_HEADER};
pub use settings::{GlobalSettings, ResolvedConfig, ServiceConfig, SharedAccount, DEFAULT_TIMEOUT_SECS};
pub use store::{ConfigStore, TemplateKind};
