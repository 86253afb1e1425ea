//! Chunked hashing strategy
//!
//! Used when the file is larger than the planned capacity. One chunk buffer
//! of exactly `capacity` bytes is allocated and reused for every read. Each
//! chunk is fed to every hash state, in request order, before the next read.

use super::{HashingContext, HashingStrategy, PerformanceMetrics, StrategyResult};
use crate::error::IoError;
use crate::hashing::{DigestResult, HashMode, HashState};
use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::source::ByteStream;
use crate::{Error, Result};
use async_trait::async_trait;
use log::{trace, warn};
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncReadExt;

/// Streaming strategy - all algorithms share a single pass over the file
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingStrategy;

impl StreamingStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Read the stream to exhaustion, feeding every state
    ///
    /// Returns `(bytes_processed, reads)`.
    async fn pump(
        context: &HashingContext<'_>,
        stream: &mut ByteStream,
        buffer: &mut [u8],
        states: &mut [HashState],
        progress_provider: &dyn ProgressProvider,
    ) -> Result<(u64, u64)> {
        let mut bytes_processed = 0u64;
        let mut io_operations = 0u64;

        loop {
            context.check_cancelled()?;

            let n = stream.read(buffer).await.map_err(|e| {
                Error::Io(IoError::read_failure(Path::new(context.source.name()), e))
            })?;
            io_operations += 1;

            if n == 0 {
                break;
            }

            let chunk = &buffer[..n];
            for state in states.iter_mut() {
                state.update(chunk);
            }

            bytes_processed += n as u64;
            trace!(
                "{}: chunk of {} bytes ({}/{})",
                context.source.name(),
                n,
                bytes_processed,
                context.file_size
            );

            progress_provider.report(ProgressUpdate::HashProgress {
                source: context.source.name().to_string(),
                mode: HashMode::Streaming,
                bytes_processed,
                total_bytes: context.file_size,
            });
        }

        Ok((bytes_processed, io_operations))
    }
}

#[async_trait]
impl HashingStrategy for StreamingStrategy {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn mode(&self) -> HashMode {
        HashMode::Streaming
    }

    async fn execute_with_progress(
        &self,
        context: HashingContext<'_>,
        progress_provider: &dyn ProgressProvider,
    ) -> Result<StrategyResult> {
        let start_time = Instant::now();
        context.check_cancelled()?;

        let mut states: Vec<HashState> = context
            .algorithms
            .iter()
            .map(|&algorithm| algorithm.new_state())
            .collect();

        let mut stream = context.source.open().await?;
        let mut buffer = context
            .memory_tracker
            .allocate(context.capacity.as_usize())?;

        let pumped = Self::pump(
            &context,
            &mut stream,
            &mut buffer,
            &mut states,
            progress_provider,
        )
        .await;

        context.memory_tracker.release(buffer);
        drop(stream);
        let (bytes_processed, io_operations) = pumped?;

        if bytes_processed != context.file_size {
            warn!(
                "{} changed size while hashing: expected {} bytes, read {}",
                context.source.name(),
                context.file_size,
                bytes_processed
            );
        }

        let entries = states
            .into_iter()
            .map(HashState::finalize_entry)
            .collect();

        let duration = start_time.elapsed();
        Ok(StrategyResult {
            digests: DigestResult {
                source: context.source.name().to_string(),
                input_size: bytes_processed,
                mode: HashMode::Streaming,
                entries,
                duration,
            },
            metrics: PerformanceMetrics::new(
                duration,
                bytes_processed,
                context.capacity.bytes(),
                io_operations,
            ),
        })
    }

    fn is_suitable(&self, context: &HashingContext<'_>) -> bool {
        !context.capacity.fits(context.file_size)
    }
}
