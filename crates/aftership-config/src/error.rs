//! Error types for configuration loading
//!
//! This module defines the errors that can occur while locating, parsing,
//! and saving an aftership configuration document.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error types.
///
/// Every variant is a hard stop: the loader never retries and never falls
/// back to a partially parsed document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named config file does not exist
    #[error("Config file not found: {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The file exists but holds an empty or null document
    #[error("Config file is empty: {}", path.display())]
    Empty {
        /// Path of the empty file.
        path: PathBuf,
    },

    /// The document could not be parsed or has the wrong shape
    #[error("Malformed config{}: {message}", source_suffix(path))]
    Malformed {
        /// Path of the offending file, if the document came from disk.
        path: Option<PathBuf>,
        /// Parser or shape error.
        message: String,
        /// YAML parser error, when the document did not parse.
        #[source]
        source: Option<serde_yaml::Error>,
    },

    /// Reading or writing the file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the config back to YAML failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// Service name outside the six known services
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Refused to overwrite an existing config file
    #[error("Config file already exists: {}", path.display())]
    ConfigExists {
        /// Existing file.
        path: PathBuf,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn source_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" in {}", p.display()),
        None => String::new(),
    }
}

impl ConfigError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ConfigError::Malformed {
            path: None,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn yaml(path: Option<PathBuf>, source: serde_yaml::Error) -> Self {
        ConfigError::Malformed {
            path,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Attach the file path to a malformed-document error raised while
    /// interpreting an in-memory mapping.
    pub(crate) fn at_path(self, file: &std::path::Path) -> Self {
        match self {
            ConfigError::Malformed {
                path: None,
                message,
                source,
            } => ConfigError::Malformed {
                path: Some(file.to_path_buf()),
                message,
                source,
            },
            other => other,
        }
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::NotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::Empty { .. } => "CONFIG_EMPTY",
            ConfigError::Malformed { .. } => "CONFIG_MALFORMED",
            ConfigError::Io { .. } => "CONFIG_IO",
            ConfigError::Serialize(_) => "CONFIG_SERIALIZE",
            ConfigError::UnknownService(_) => "UNKNOWN_SERVICE",
            ConfigError::ConfigExists { .. } => "CONFIG_EXISTS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_path() {
        let err = ConfigError::malformed("timeout must be an integer")
            .at_path(std::path::Path::new("/tmp/aftership.yaml"));
        assert_eq!(
            err.to_string(),
            "Malformed config in /tmp/aftership.yaml: timeout must be an integer"
        );
        assert_eq!(err.error_code(), "CONFIG_MALFORMED");
    }

    #[test]
    fn test_malformed_without_path() {
        let err = ConfigError::malformed("bad block");
        assert_eq!(err.to_string(), "Malformed config: bad block");
    }

    #[test]
    fn test_yaml_error_is_kept_as_source() {
        use std::error::Error as _;

        let parse_err = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2").unwrap_err();
        let err = ConfigError::yaml(None, parse_err).at_path(std::path::Path::new("x.yaml"));

        assert!(matches!(err, ConfigError::Malformed { path: Some(_), .. }));
        let source = err.source().expect("parser error should be chained");
        assert!(source.downcast_ref::<serde_yaml::Error>().is_some());
    }

    #[test]
    fn test_at_path_keeps_other_errors() {
        let err = ConfigError::UnknownService("nope".to_string())
            .at_path(std::path::Path::new("x.yaml"));
        assert!(matches!(err, ConfigError::UnknownService(_)));
    }
}
