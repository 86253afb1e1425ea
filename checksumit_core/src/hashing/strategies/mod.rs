//! Hash calculation strategies
//!
//! Two strategies cover every file:
//!
//! - `BufferedStrategy`: the whole file is read in one operation and each
//!   algorithm is fed the complete buffer in a single update
//! - `StreamingStrategy`: the file is read through one reusable chunk buffer
//!   of exactly the planned capacity, every chunk fed to all algorithms
//!
//! The selector picks between them by comparing file size to capacity.

use crate::buffer::MemoryTracker;
use crate::cancellation::CancellationFlag;
use crate::capacity::CapacityBound;
use crate::hashing::{DigestResult, HashAlgorithm, HashMode};
use crate::progress::{NullProvider, ProgressProvider};
use crate::source::FileSource;
use crate::{Error, Result, error::InternalError};
use async_trait::async_trait;
use std::time::Duration;

mod buffered;
mod selector;
mod streaming;

pub use buffered::BufferedStrategy;
pub use selector::StrategySelector;
pub use streaming::StreamingStrategy;

/// Context information passed to hashing strategies
#[derive(Clone, Copy)]
pub struct HashingContext<'a> {
    /// File being hashed
    pub source: &'a dyn FileSource,
    /// Size of the file in bytes, as reported before reading
    pub file_size: u64,
    /// Algorithms in request order
    pub algorithms: &'a [HashAlgorithm],
    /// Planned capacity for this operation
    pub capacity: CapacityBound,
    /// Accounts for buffers held while hashing
    pub memory_tracker: &'a MemoryTracker,
    /// Checked before every read
    pub cancel: Option<&'a CancellationFlag>,
}

impl std::fmt::Debug for HashingContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingContext")
            .field("source", &self.source.name())
            .field("file_size", &self.file_size)
            .field("algorithms", &self.algorithms)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl HashingContext<'_> {
    /// Fail with `Cancelled` if the caller asked to stop
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.is_cancelled() => Err(Error::Internal(InternalError::cancelled(
                self.source.name(),
            ))),
            _ => Ok(()),
        }
    }
}

/// Performance metrics from strategy execution
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Total duration of the operation
    pub duration: Duration,
    /// Average throughput in MB/s
    pub throughput_mbps: f64,
    /// Peak memory usage in bytes
    pub peak_memory_bytes: u64,
    /// Number of I/O operations performed
    pub io_operations: u64,
}

impl PerformanceMetrics {
    pub(crate) fn new(
        duration: Duration,
        bytes_processed: u64,
        peak_memory_bytes: u64,
        io_operations: u64,
    ) -> Self {
        let throughput_mbps = if duration.as_secs_f64() > 0.0 {
            (bytes_processed as f64 / 1_048_576.0) / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            duration,
            throughput_mbps,
            peak_memory_bytes,
            io_operations,
        }
    }
}

/// Result from strategy execution
#[derive(Debug)]
pub struct StrategyResult {
    /// Digests in request order
    pub digests: DigestResult,
    /// Performance metrics from execution
    pub metrics: PerformanceMetrics,
}

/// Core trait for hash calculation strategies
#[async_trait]
pub trait HashingStrategy: Send + Sync {
    /// Strategy identifier for logging and metrics
    fn name(&self) -> &'static str;

    /// Mode reported in results
    fn mode(&self) -> HashMode;

    /// Execute the hashing strategy without progress reporting
    async fn execute(&self, context: HashingContext<'_>) -> Result<StrategyResult> {
        self.execute_with_progress(context, &NullProvider).await
    }

    /// Execute the hashing strategy with progress reporting
    async fn execute_with_progress(
        &self,
        context: HashingContext<'_>,
        progress_provider: &dyn ProgressProvider,
    ) -> Result<StrategyResult>;

    /// Check if this strategy is suitable for the given context
    fn is_suitable(&self, context: &HashingContext<'_>) -> bool;
}
