//! File discovery for the paths given on the command line
//!
//! Plain paths are passed through untouched, including ones that do not
//! exist, so they surface as per-file failures. Directories are expanded
//! with optional include and exclude glob patterns.

mod filter;
mod walker;

pub use filter::PathFilter;
pub use walker::{FileDiscovery, FileDiscoveryOptions, expand_paths};

use std::path::PathBuf;

/// Result of file discovery
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path to the discovered file
    pub path: PathBuf,
    /// Size of the file in bytes
    pub size: u64,
}

/// Error type for file discovery operations
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Result type for file discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
