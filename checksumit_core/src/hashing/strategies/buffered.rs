//! Whole-file hashing strategy
//!
//! Used when the file fits inside the planned capacity. The file is read in
//! one operation and every algorithm receives the complete buffer in a single
//! update.

use super::{HashingContext, HashingStrategy, PerformanceMetrics, StrategyResult};
use crate::hashing::{DigestResult, HashMode};
use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::Result;
use async_trait::async_trait;
use log::{trace, warn};
use std::time::Instant;

/// Buffered strategy - one read, one update per algorithm
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferedStrategy;

impl BufferedStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HashingStrategy for BufferedStrategy {
    fn name(&self) -> &'static str {
        "buffered"
    }

    fn mode(&self) -> HashMode {
        HashMode::Buffered
    }

    async fn execute_with_progress(
        &self,
        context: HashingContext<'_>,
        progress_provider: &dyn ProgressProvider,
    ) -> Result<StrategyResult> {
        let start_time = Instant::now();
        context.check_cancelled()?;

        let reserved = usize::try_from(context.file_size).unwrap_or(usize::MAX);
        context.memory_tracker.reserve(reserved)?;

        let data = match context.source.read_all().await {
            Ok(data) => data,
            Err(e) => {
                context.memory_tracker.unreserve(reserved);
                return Err(e);
            }
        };

        if data.len() as u64 != context.file_size {
            warn!(
                "{} changed size while hashing: expected {} bytes, read {}",
                context.source.name(),
                context.file_size,
                data.len()
            );
        }

        trace!(
            "Feeding {} bytes of {} to {} algorithm(s)",
            data.len(),
            context.source.name(),
            context.algorithms.len()
        );

        let entries = context
            .algorithms
            .iter()
            .map(|&algorithm| {
                let mut state = algorithm.new_state();
                state.update(&data);
                state.finalize_entry()
            })
            .collect();

        let bytes_processed = data.len() as u64;
        drop(data);
        context.memory_tracker.unreserve(reserved);

        progress_provider.report(ProgressUpdate::HashProgress {
            source: context.source.name().to_string(),
            mode: HashMode::Buffered,
            bytes_processed,
            total_bytes: context.file_size,
        });

        let duration = start_time.elapsed();
        Ok(StrategyResult {
            digests: DigestResult {
                source: context.source.name().to_string(),
                input_size: bytes_processed,
                mode: HashMode::Buffered,
                entries,
                duration,
            },
            metrics: PerformanceMetrics::new(duration, bytes_processed, bytes_processed, 1),
        })
    }

    fn is_suitable(&self, context: &HashingContext<'_>) -> bool {
        context.capacity.fits(context.file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryTracker;
    use crate::capacity::CapacityBound;
    use crate::cancellation::CancellationFlag;
    use crate::hashing::HashAlgorithm;
    use crate::source::LocalFile;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_buffered_known_vectors() {
        let file = temp_file(b"abc");
        let source = LocalFile::new(file.path());
        let tracker = MemoryTracker::unbounded();
        let algorithms = [HashAlgorithm::MD5, HashAlgorithm::SHA256];

        let context = HashingContext {
            source: &source,
            file_size: 3,
            algorithms: &algorithms,
            capacity: CapacityBound::MIN,
            memory_tracker: &tracker,
            cancel: None,
        };

        let result = BufferedStrategy.execute(context).await.unwrap();
        assert_eq!(
            result.digests.hex_digests(),
            vec![
                "900150983cd24fb0d6963f7d28e17f72",
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ]
        );
        assert_eq!(result.digests.mode, HashMode::Buffered);
        assert_eq!(result.metrics.io_operations, 1);
        assert_eq!(tracker.used(), 0);
    }

    #[tokio::test]
    async fn test_buffered_respects_memory_limit() {
        let file = temp_file(&[7u8; 4096]);
        let source = LocalFile::new(file.path());
        let tracker = MemoryTracker::new(1024);
        let algorithms = [HashAlgorithm::SHA1];

        let context = HashingContext {
            source: &source,
            file_size: 4096,
            algorithms: &algorithms,
            capacity: CapacityBound::MIN,
            memory_tracker: &tracker,
            cancel: None,
        };

        let err = BufferedStrategy.execute(context).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Internal(crate::error::InternalError::MemoryLimitExceeded { .. })
        ));
        assert_eq!(tracker.used(), 0);
    }

    #[tokio::test]
    async fn test_buffered_cancelled_before_read() {
        let file = temp_file(b"data");
        let source = LocalFile::new(file.path());
        let tracker = MemoryTracker::unbounded();
        let flag = CancellationFlag::new();
        flag.cancel();
        let algorithms = [HashAlgorithm::MD5];

        let context = HashingContext {
            source: &source,
            file_size: 4,
            algorithms: &algorithms,
            capacity: CapacityBound::MIN,
            memory_tracker: &tracker,
            cancel: Some(&flag),
        };

        let err = BufferedStrategy.execute(context).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
