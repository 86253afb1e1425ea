//! Validation related error types

use thiserror::Error;

/// Validation errors for names and configuration values
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Algorithm name outside the supported set
    #[error("Unsupported hash algorithm '{name}' (supported: MD5, SHA-1, SHA-256, SHA-384, SHA-512)")]
    UnsupportedAlgorithm { name: String },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },
}

impl ValidationError {
    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm(name: &str) -> Self {
        Self::UnsupportedAlgorithm {
            name: name.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }
}
