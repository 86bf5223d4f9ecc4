//! # Aftership Client
//!
//! This crate provides a single facade over the six aftership REST services,
//! each reached through an API-key authenticated HTTP session.
//!
//! ## Overview
//!
//! The aftership-client crate handles:
//! - **MetaClient**: Owns one session per configured service
//! - **ServiceHandle**: Generic HTTP verbs with the key header injected
//! - **Construction**: Explicit arguments, config files or the environment
//!
//! ## Supported Services
//!
//! - `darkship.io`: Shipping operations
//! - `darkstorage.io`: S3-compatible storage
//! - `shipshack.io`: Fleet management
//! - `models2go.com`: Model publishing and management
//! - `hostscience.io`: Hosting infrastructure
//! - `aiserve.farm`: AI compute management
//!
//! ## Usage
//!
//! ### Explicit keys
//!
//! ```rust,no_run
//! use aftership_client::{MetaClient, RequestOptions, Service};
//!
//! async fn example() -> Result<(), aftership_client::ClientError> {
//!     let client = MetaClient::builder()
//!         .api_key(Service::Darkship, "darkship-key")
//!         .build()?;
//!
//!     let shipments = client
//!         .darkship()?
//!         .get_with("/v1/shipments", RequestOptions::new().query("status", "active"))
//!         .await?;
//!     println!("{}", shipments.text());
//!     Ok(())
//! }
//! ```
//!
//! ### Config file with environment fallback
//!
//! ```rust,no_run
//! use aftership_client::MetaClient;
//!
//! async fn example() -> Result<(), aftership_client::ClientError> {
//!     // ./aftership.yaml, ~/.aftership/config.yaml, ~/.config/aftership/config.yaml
//!     let client = MetaClient::load(None)?;
//!     for service in client.configured_services() {
//!         println!("configured: {}", service);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Sessions are closed when the client is dropped or on
//! [`MetaClient::close_all`].

pub mod error;
pub mod handle;
pub mod meta;
pub mod request;

// Re-export main types
pub use error::{ClientError, ClientResult};
pub use handle::{ServiceHandle, CLIENT_USER_AGENT};
pub use meta::{ClientOptions, MetaClient};
pub use request::{ApiResponse, RequestOptions};

// Re-export configuration types used at the API surface
pub use aftership_config::{
    ConfigError, ConfigStore, CredentialResolver, EnvSource, GlobalSettings, ResolvedConfig,
    Service, ServiceConfig, SharedAccount,
};
pub use reqwest::Method;
