//! Error types for the checksumit core library
//!
//! This module contains all error types used throughout the library, organized
//! into logical categories for better maintainability and clarity.

use thiserror::Error;

pub mod internal;
pub mod io;
pub mod validation;

pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;
pub use internal::InternalError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the checksumit core library
///
/// Errors are categorized into three main types:
/// - I/O errors: opening and reading the files being hashed
/// - Validation errors: unsupported algorithms and bad configuration
/// - Internal errors: memory limits, cancellation and invariant failures
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal library errors
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Whether this error was raised because the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Internal(InternalError::Cancelled { .. }))
    }
}

// Conversions from external error types

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_file_not_found_error_creation() {
        let path = Path::new("/non/existent/file.iso");
        let error = Error::Io(IoError::file_not_found(path));

        match error {
            Error::Io(io_err) => {
                assert_eq!(io_err.kind, IoErrorKind::FileNotFound);
                assert_eq!(io_err.path, Some(path.to_path_buf()));
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_read_failure_error_creation() {
        let path = Path::new("/mnt/flaky/disk.img");
        let io_error = io::Error::new(io::ErrorKind::UnexpectedEof, "device went away");
        let error = Error::Io(IoError::read_failure(path, io_error));

        match error {
            Error::Io(io_err) => {
                assert_eq!(io_err.kind, IoErrorKind::ReadFailure);
                assert_eq!(io_err.path, Some(path.to_path_buf()));
                assert!(io_err.source.is_some());
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_unsupported_algorithm_error() {
        let error = Error::Validation(ValidationError::unsupported_algorithm("CRC32"));

        assert!(matches!(
            error,
            Error::Validation(ValidationError::UnsupportedAlgorithm { .. })
        ));
        assert!(error.to_string().contains("Unsupported hash algorithm"));
        assert!(error.to_string().contains("CRC32"));
    }

    #[test]
    fn test_memory_limit_exceeded_error() {
        let limit = 500_000_000;
        let current = 600_000_000;
        let error = Error::Internal(InternalError::memory_limit_exceeded(limit, current));

        assert!(matches!(
            error,
            Error::Internal(InternalError::MemoryLimitExceeded { .. })
        ));
        assert!(error.to_string().contains("Memory limit exceeded"));
        assert!(error.to_string().contains("500000000"));
        assert!(error.to_string().contains("600000000"));
    }

    #[test]
    fn test_cancelled_error() {
        let error = Error::Internal(InternalError::cancelled("movie.mkv"));
        assert!(error.is_cancelled());
        assert!(error.to_string().contains("movie.mkv"));

        let other = Error::Internal(InternalError::assertion("boom"));
        assert!(!other.is_cancelled());
    }

    #[test]
    fn test_error_display() {
        let path = Path::new("/test/file.iso");
        let error = Error::Io(IoError::file_not_found(path));
        let display_string = format!("{error}");

        assert!(display_string.contains("File not found"));
        assert!(display_string.contains("/test/file.iso"));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = Error::Internal(InternalError::memory_limit_exceeded(1024, 2048));

        // Should compile if Error implements std::error::Error
        let _: &dyn StdError = &error;
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();

        match error {
            Error::Io(io_err) => {
                assert_eq!(io_err.kind, IoErrorKind::FileNotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Access denied");
        let path = Path::new("/test/file.iso");
        let error = Error::Io(IoError::permission_denied(path, io_error));

        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
