//! Internal library error types

use thiserror::Error;

/// Internal library errors
#[derive(Error, Debug)]
pub enum InternalError {
    /// Memory limit exceeded
    #[error(
        "Memory limit exceeded: current usage {current} bytes would exceed limit of {limit} bytes"
    )]
    MemoryLimitExceeded { limit: usize, current: usize },

    /// Operation cancelled between reads
    #[error("Hashing cancelled for {source_name}")]
    Cancelled { source_name: String },

    /// Internal assertion failure
    #[error("Internal assertion failed: {message}")]
    Assertion { message: String },
}

impl InternalError {
    /// Create a memory limit exceeded error
    pub fn memory_limit_exceeded(limit: usize, current: usize) -> Self {
        Self::MemoryLimitExceeded { limit, current }
    }

    /// Create a cancellation error
    pub fn cancelled(source_name: impl Into<String>) -> Self {
        Self::Cancelled {
            source_name: source_name.into(),
        }
    }

    /// Create an internal assertion failure error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_limit_exceeded_error() {
        let error = InternalError::memory_limit_exceeded(500_000_000, 600_000_000);
        assert!(error.to_string().contains("Memory limit exceeded"));
        assert!(error.to_string().contains("500000000"));
        assert!(error.to_string().contains("600000000"));
    }

    #[test]
    fn test_cancelled_error() {
        let error = InternalError::cancelled("backup.tar");
        assert!(error.to_string().contains("cancelled"));
        assert!(error.to_string().contains("backup.tar"));
    }

    #[test]
    fn test_assertion_error() {
        let error = InternalError::assertion("Invariant violated");
        assert!(error.to_string().contains("Internal assertion failed"));
        assert!(error.to_string().contains("Invariant violated"));
    }
}
