//! checksumit Core Library
//!
//! Computes several cryptographic digests of a file from a single pass over
//! its bytes, using a memory bound planned from the host's free memory.

pub mod batch_processor;
pub mod buffer;
pub mod cancellation;
pub mod capacity;
pub mod error;
pub mod hashing;
pub mod platform;
pub mod progress;
pub mod source;

// Re-export main types
pub use batch_processor::{BatchProcessor, BatchResult, FileOutcome};
pub use buffer::MemoryTracker;
pub use cancellation::CancellationFlag;
pub use capacity::{CapacityBound, MIB, MemorySource, plan_capacity, plan_from};
pub use error::{Error, Result};
pub use hashing::{
    DigestEntry, DigestResult, HashAlgorithm, HashCalculator, HashMode, HashOptions, HashState,
    encode_hex, hash_file,
};
pub use platform::SystemMemory;
pub use progress::{NullProvider, ProgressProvider, ProgressUpdate};
pub use source::{ByteStream, FileSource, LocalFile};

use error::ValidationError;

/// Core hasher configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Files hashed at the same time by the batch processor
    pub max_concurrent_files: usize,
    /// Memory budget in MiB used instead of the host memory reading
    pub memory_limit_mb: Option<u64>,
    /// Explicit capacity in MiB, clamped to the planner range
    pub capacity_mb: Option<u64>,
    /// Algorithm names used when none are given
    pub default_algorithms: Vec<String>,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 4,
            memory_limit_mb: None,
            capacity_mb: None,
            default_algorithms: vec![HashAlgorithm::SHA256.name().to_string()],
        }
    }
}

impl HasherConfig {
    /// Check the configuration for values the hasher cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "max_concurrent_files",
                "must be at least 1",
            )));
        }
        if self.capacity_mb == Some(0) {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "capacity_mb",
                "must be at least 1",
            )));
        }
        if self.memory_limit_mb == Some(0) {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "memory_limit_mb",
                "must be at least 1",
            )));
        }
        self.default_algorithms()?;
        Ok(())
    }

    /// Resolve the configured default algorithm names
    pub fn default_algorithms(&self) -> Result<Vec<HashAlgorithm>> {
        HashAlgorithm::parse_list(&self.default_algorithms)
    }

    /// Capacity to hash with
    ///
    /// An explicit capacity wins, then a planned one from the configured
    /// memory limit, then the process-wide bound.
    pub fn resolve_capacity(&self) -> CapacityBound {
        if let Some(mib) = self.capacity_mb {
            return CapacityBound::from_mib(mib);
        }
        if let Some(limit_mb) = self.memory_limit_mb {
            return plan_capacity(limit_mb.saturating_mul(MIB), 0);
        }
        CapacityBound::process_wide()
    }

    /// Build a calculator from this configuration
    pub fn calculator(&self) -> Result<HashCalculator> {
        self.validate()?;
        Ok(HashCalculator::with_capacity(self.resolve_capacity()))
    }

    /// Build a batch processor from this configuration
    pub fn batch_processor(&self) -> Result<BatchProcessor> {
        Ok(BatchProcessor::new(
            self.calculator()?,
            self.max_concurrent_files,
        ))
    }
}
