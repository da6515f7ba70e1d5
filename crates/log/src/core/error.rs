//! Error types for logger configuration and level parsing

use thiserror::Error;

/// Errors produced while configuring a logger or parsing a level
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// Seed fields were not supplied as key/value pairs
    #[error("configuration error: odd number of seed field values ({count}), expected key/value pairs")]
    OddFieldCount {
        /// Number of flattened values supplied
        count: usize,
    },

    /// A seed field key was not a string
    #[error("configuration error: seed field key at position {position} must be a string, got {found}")]
    FieldKeyType {
        /// Index of the offending value in the flattened sequence
        position: usize,
        /// Type name of the offending value
        found: &'static str,
    },

    /// Unrecognized level string
    #[error("Unknown Level String: '{input}'")]
    UnknownLevel {
        /// The input that failed to parse
        input: String,
    },

    /// The tracing bridge could not be installed
    #[error("failed to install tracing bridge: {0}")]
    Bridge(String),
}

impl LogError {
    /// Create an unknown level error
    pub fn unknown_level(input: impl Into<String>) -> Self {
        Self::UnknownLevel {
            input: input.into(),
        }
    }

    /// Whether this error comes from malformed configuration input
    pub fn is_config(&self) -> bool {
        matches!(self, Self::OddFieldCount { .. } | Self::FieldKeyType { .. })
    }
}

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;
