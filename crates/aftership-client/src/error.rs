//! Client error types.

use aftership_config::{ConfigError, Service};
use thiserror::Error;

/// Errors surfaced by the meta client and its service handles.
///
/// Nothing here is retried; every failure reaches the immediate caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credential could be resolved for the requested service.
    #[error(
        "{service} client not initialized. Provide {argument} during initialization \
         or set the {env_var} environment variable."
    )]
    ServiceNotConfigured {
        /// Requested service.
        service: Service,
        /// Construction argument that would have enabled it.
        argument: &'static str,
        /// Environment variable that would have enabled it.
        env_var: &'static str,
    },

    /// Network, DNS or TLS failure from the HTTP layer.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{service} API error ({status}): {body}")]
    HttpStatus {
        /// Service that answered.
        service: Service,
        /// HTTP status code.
        status: u16,
        /// Response body, unmodified.
        body: String,
    },

    /// The handle's session was already closed.
    #[error("{service} session is closed")]
    SessionClosed {
        /// Service whose session is closed.
        service: Service,
    },

    /// A header name or value could not be encoded.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Encoding error.
        message: String,
    },

    /// A request body could not be encoded.
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// A response body did not decode as expected.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Loading configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn not_configured(service: Service) -> Self {
        ClientError::ServiceNotConfigured {
            service,
            argument: service.api_key_argument(),
            env_var: service.api_key_env_var(),
        }
    }

    /// HTTP status of a non-2xx response, if this is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ServiceNotConfigured { .. } => "SERVICE_NOT_CONFIGURED",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::HttpStatus { .. } => "HTTP_STATUS_ERROR",
            ClientError::SessionClosed { .. } => "SESSION_CLOSED",
            ClientError::InvalidHeader { .. } => "INVALID_HEADER",
            ClientError::InvalidRequest(_) => "INVALID_REQUEST",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::Config(e) => e.error_code(),
        }
    }
}
