//! Core error types for capability probing.
//!
//! [`ProbeError`] is the error surfaced to callers of a capability context.
//! [`SourceError`] is what external collaborators report; most probes
//! swallow it and degrade to a negative answer, so it only reaches callers
//! through the fatal snapshot path.

use thiserror::Error;

/// Central error type for capability probing.
///
/// Only a handful of operations can fail outright: loading the environment
/// snapshot (there is no safe default for "what environment am I in") and
/// the isolation probe when its collaborator reports an unexpected fault.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external collaborator failed
    #[error("{collaborator} failed: {source}")]
    Source {
        /// Collaborator that produced the error
        collaborator: &'static str,
        /// Underlying collaborator error
        #[source]
        source: SourceError,
    },

    /// The environment source did not return exactly one record
    #[error("environment source returned {count} records, expected exactly one")]
    SnapshotCardinality {
        /// Number of records returned
        count: usize,
    },

    /// The environment record failed validation
    #[error("invalid environment snapshot field {field}: {reason}")]
    InvalidSnapshot {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Validation errors (invalid identifiers, out-of-range values)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Wrap a collaborator error with the collaborator's name.
    #[must_use]
    pub fn collaborator(collaborator: &'static str, source: SourceError) -> Self {
        Self::Source {
            collaborator,
            source,
        }
    }
}

/// Errors reported by external collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The requested record or resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation or record type is not supported in this environment
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The backing service could not be reached
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The query itself failed
    #[error("query failed: {0}")]
    Query(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `ProbeError`.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::SnapshotCardinality { count: 0 };
        assert_eq!(
            err.to_string(),
            "environment source returned 0 records, expected exactly one"
        );

        let err = ConfigError::NoConfigDir;
        assert_eq!(
            err.to_string(),
            "could not determine config directory (XDG base directories not available)"
        );
    }

    #[test]
    fn test_source_error_wrapping() {
        let err = ProbeError::collaborator(
            "environment source",
            SourceError::Unavailable("metadata store offline".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "environment source failed: unavailable: metadata store offline"
        );
        assert!(matches!(
            err,
            ProbeError::Source {
                source: SourceError::Unavailable(_),
                ..
            }
        ));
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let probe_err: ProbeError = config_err.into();
        assert!(matches!(probe_err, ProbeError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let probe_err: ProbeError = io_err.into();
        assert!(matches!(probe_err, ProbeError::Io(_)));
    }
}
