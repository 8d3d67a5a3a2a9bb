//! Error types and handling for Foxflow
//!
//! Derivation itself never fails: missing telemetry becomes zero and
//! calculator bounds become `None`. Errors only arise around the edges,
//! when loading configuration, decoding vendor responses or talking to a
//! telemetry source.

use thiserror::Error;

/// Result type alias for Foxflow operations
pub type Result<T> = std::result::Result<T, FoxflowError>;

/// Main error type for Foxflow
#[derive(Debug, Error)]
pub enum FoxflowError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The OpenAPI answered with a non-zero errno
    #[error("API error {errno}: {message}")]
    Api { errno: i64, message: String },

    /// Malformed values inside an otherwise valid response
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl FoxflowError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(errno: i64, message: S) -> Self {
        Self::Api {
            errno,
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for FoxflowError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for FoxflowError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FoxflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for FoxflowError {
    fn from(err: chrono::ParseError) -> Self {
        Self::parse(format!("invalid datetime: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FoxflowError::config("test config error");
        assert!(matches!(err, FoxflowError::Config { .. }));

        let err = FoxflowError::api(40257, "invalid parameter");
        assert!(matches!(err, FoxflowError::Api { errno: 40257, .. }));

        let err = FoxflowError::validation("field", "test validation error");
        assert!(matches!(err, FoxflowError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = FoxflowError::config("test error");
        assert_eq!(err.to_string(), "Configuration error: test error");

        let err = FoxflowError::validation("battery.min_soc", "out of range");
        assert_eq!(
            err.to_string(),
            "Validation error: battery.min_soc - out of range"
        );

        let err = FoxflowError::api(41809, "token invalid");
        assert_eq!(err.to_string(), "API error 41809: token invalid");
    }
}
