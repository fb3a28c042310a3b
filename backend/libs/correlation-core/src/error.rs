//! Error types for correlation configuration and header encoding
//!
//! Resolution itself never fails. These errors only surface when slot keys
//! are misconfigured or when an identifier has to be written into a
//! transport header that cannot carry it.

use thiserror::Error;

/// Result type for correlation operations
pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Errors that can occur around correlation id handling
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// A slot key is empty, duplicated, or not a valid header name
    #[error("Invalid correlation header key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// An identifier cannot be encoded as an ASCII header value
    #[error("Invalid value for header '{key}': {value:?}")]
    InvalidValue { key: String, value: String },

    /// Environment configuration could not be parsed
    #[error("Correlation config error: {0}")]
    Config(String),
}

impl CorrelationError {
    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<envy::Error> for CorrelationError {
    fn from(err: envy::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_message() {
        let err = CorrelationError::invalid_key("", "key must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid correlation header key '': key must not be empty"
        );
    }

    #[test]
    fn test_invalid_value_message_quotes_value() {
        let err = CorrelationError::invalid_value("x-request-id", "bad\nvalue");
        assert!(err.to_string().contains("x-request-id"));
        assert!(err.to_string().contains("\\n"));
    }
}
