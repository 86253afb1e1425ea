//! Hash calculation functionality for the checksumit core library
//!
//! Every requested algorithm is computed from a single pass over the file.
//! Files that fit the planned capacity are read whole; larger files are
//! streamed through one reusable chunk buffer, each chunk fed to every
//! algorithm before the next read.

use crate::buffer::MemoryTracker;
use crate::cancellation::CancellationFlag;
use crate::capacity::CapacityBound;
use crate::progress::{NullProvider, ProgressProvider};
use crate::source::{FileSource, LocalFile};
use crate::{Error, Result, error::ValidationError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod algorithms;
mod state;
mod strategies;
mod traits;

pub use state::HashState;
pub use strategies::{
    BufferedStrategy, HashingContext, HashingStrategy, PerformanceMetrics, StrategyResult,
    StrategySelector, StreamingStrategy,
};
pub use traits::StreamingHasher;

/// Hash algorithms supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// MD5 hash algorithm
    #[serde(rename = "MD5")]
    MD5,
    /// SHA-1 hash algorithm
    #[serde(rename = "SHA-1")]
    SHA1,
    /// SHA-256 hash algorithm
    #[serde(rename = "SHA-256")]
    SHA256,
    /// SHA-384 hash algorithm
    #[serde(rename = "SHA-384")]
    SHA384,
    /// SHA-512 hash algorithm
    #[serde(rename = "SHA-512")]
    SHA512,
}

impl HashAlgorithm {
    /// Every supported algorithm, in display order
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::MD5,
        HashAlgorithm::SHA1,
        HashAlgorithm::SHA256,
        HashAlgorithm::SHA384,
        HashAlgorithm::SHA512,
    ];

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::MD5 => "MD5",
            HashAlgorithm::SHA1 => "SHA-1",
            HashAlgorithm::SHA256 => "SHA-256",
            HashAlgorithm::SHA384 => "SHA-384",
            HashAlgorithm::SHA512 => "SHA-512",
        }
    }

    /// Length of the binary digest in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::MD5 => 16,
            HashAlgorithm::SHA1 => 20,
            HashAlgorithm::SHA256 => 32,
            HashAlgorithm::SHA384 => 48,
            HashAlgorithm::SHA512 => 64,
        }
    }

    /// Create a fresh incremental state for this algorithm
    pub fn new_state(self) -> HashState {
        HashState::new(self)
    }

    /// Resolve a list of names, failing on the first unsupported one
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<HashAlgorithm>> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "MD5" => Ok(HashAlgorithm::MD5),
            "SHA1" => Ok(HashAlgorithm::SHA1),
            "SHA256" => Ok(HashAlgorithm::SHA256),
            "SHA384" => Ok(HashAlgorithm::SHA384),
            "SHA512" => Ok(HashAlgorithm::SHA512),
            _ => Err(Error::Validation(ValidationError::unsupported_algorithm(s))),
        }
    }
}

/// Encode digest bytes as lowercase hex
pub fn encode_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}

/// How a file's bytes were delivered to the hash states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// Whole file read into one buffer
    Buffered,
    /// File read chunk by chunk through a reusable buffer
    Streaming,
}

impl std::fmt::Display for HashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashMode::Buffered => write!(f, "buffered"),
            HashMode::Streaming => write!(f, "streaming"),
        }
    }
}

/// One digest of a [`DigestResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

/// Digests of one file, in the order the algorithms were requested
///
/// Duplicate requests keep their positions and produce identical entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestResult {
    pub source: String,
    pub input_size: u64,
    pub mode: HashMode,
    pub entries: Vec<DigestEntry>,
    pub duration: Duration,
}

impl DigestResult {
    /// Hex digests in request order
    pub fn hex_digests(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.hex.as_str()).collect()
    }

    /// Hex digests in request order, by value
    pub fn into_hex_digests(self) -> Vec<String> {
        self.entries.into_iter().map(|e| e.hex).collect()
    }

    /// Algorithms in request order
    pub fn algorithms(&self) -> Vec<HashAlgorithm> {
        self.entries.iter().map(|e| e.algorithm).collect()
    }

    /// Entry at a request position
    pub fn get(&self, index: usize) -> Option<&DigestEntry> {
        self.entries.get(index)
    }

    /// Number of digests
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no digests were requested
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-call options for [`HashCalculator::hash_file_with_options`]
#[derive(Clone, Copy)]
pub struct HashOptions<'a> {
    pub progress: &'a dyn ProgressProvider,
    pub cancel: Option<&'a CancellationFlag>,
}

impl Default for HashOptions<'_> {
    fn default() -> Self {
        Self {
            progress: &NullProvider,
            cancel: None,
        }
    }
}

impl<'a> HashOptions<'a> {
    /// Report progress to the given provider
    pub fn with_progress(mut self, progress: &'a dyn ProgressProvider) -> Self {
        self.progress = progress;
        self
    }

    /// Check the given flag between reads
    pub fn with_cancellation(mut self, cancel: &'a CancellationFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Hash calculator for file processing
#[derive(Clone)]
pub struct HashCalculator {
    /// Largest buffer a single file may occupy
    capacity: CapacityBound,
    /// Chooses buffered or streaming mode per file
    selector: Arc<StrategySelector>,
    /// Accounts for the buffers of in-flight operations
    memory_tracker: MemoryTracker,
}

impl std::fmt::Debug for HashCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashCalculator")
            .field("capacity", &self.capacity)
            .field("memory_limit", &self.memory_tracker.limit())
            .field("memory_used", &self.memory_tracker.used())
            .finish()
    }
}

impl HashCalculator {
    /// Create a calculator using the process-wide capacity
    pub fn new() -> Self {
        Self::with_capacity(CapacityBound::process_wide())
    }

    /// Create a calculator with an explicit capacity
    pub fn with_capacity(capacity: CapacityBound) -> Self {
        Self {
            capacity,
            selector: Arc::new(StrategySelector::new()),
            memory_tracker: MemoryTracker::unbounded(),
        }
    }

    /// Same calculator with a different capacity, sharing its tracker
    pub fn with_capacity_bound(&self, capacity: CapacityBound) -> Self {
        Self {
            capacity,
            selector: Arc::clone(&self.selector),
            memory_tracker: self.memory_tracker.clone(),
        }
    }

    /// Use the given tracker for buffer accounting
    pub fn with_memory_tracker(mut self, tracker: MemoryTracker) -> Self {
        self.memory_tracker = tracker;
        self
    }

    /// Capacity this calculator streams with
    pub fn capacity(&self) -> CapacityBound {
        self.capacity
    }

    /// Get the memory tracker for this calculator
    pub fn memory_tracker(&self) -> &MemoryTracker {
        &self.memory_tracker
    }

    /// Mode that would be used for a file of `file_size` bytes
    pub fn mode_for(&self, file_size: u64) -> HashMode {
        StrategySelector::mode_for(file_size, self.capacity)
    }

    /// Hash in-memory data with every requested algorithm
    pub fn hash_bytes(&self, data: &[u8], algorithms: &[HashAlgorithm]) -> DigestResult {
        let start_time = Instant::now();
        let entries = algorithms
            .iter()
            .map(|&algorithm| {
                let mut state = algorithm.new_state();
                state.update(data);
                state.finalize_entry()
            })
            .collect();

        DigestResult {
            source: "<memory>".to_string(),
            input_size: data.len() as u64,
            mode: HashMode::Buffered,
            entries,
            duration: start_time.elapsed(),
        }
    }

    /// Hash a file with every requested algorithm
    pub async fn hash_file(
        &self,
        source: &dyn FileSource,
        algorithms: &[HashAlgorithm],
    ) -> Result<DigestResult> {
        self.hash_file_with_options(source, algorithms, HashOptions::default())
            .await
    }

    /// Hash a file, resolving algorithm names before touching the file
    pub async fn hash_file_by_names<S: AsRef<str>>(
        &self,
        source: &dyn FileSource,
        names: &[S],
    ) -> Result<DigestResult> {
        let algorithms = HashAlgorithm::parse_list(names)?;
        self.hash_file(source, &algorithms).await
    }

    /// Hash the file at `path`
    pub async fn hash_path(
        &self,
        path: &Path,
        algorithms: &[HashAlgorithm],
    ) -> Result<DigestResult> {
        self.hash_file(&LocalFile::new(path), algorithms).await
    }

    /// Hash a file with progress reporting and cancellation
    pub async fn hash_file_with_options(
        &self,
        source: &dyn FileSource,
        algorithms: &[HashAlgorithm],
        options: HashOptions<'_>,
    ) -> Result<DigestResult> {
        let file_size = source.size().await?;

        let context = HashingContext {
            source,
            file_size,
            algorithms,
            capacity: self.capacity,
            memory_tracker: &self.memory_tracker,
            cancel: options.cancel,
        };

        let strategy = self.selector.select(&context);

        if algorithms.is_empty() {
            return Ok(DigestResult {
                source: source.name().to_string(),
                input_size: file_size,
                mode: strategy.mode(),
                entries: Vec::new(),
                duration: Duration::ZERO,
            });
        }

        debug!(
            "Hashing {} ({} bytes) in {} mode with capacity {}",
            source.name(),
            file_size,
            strategy.mode(),
            self.capacity
        );

        let result = strategy
            .execute_with_progress(context, options.progress)
            .await?;

        debug!(
            "Hashed {} in {:?} ({:.1} MB/s, {} reads, peak {} bytes)",
            source.name(),
            result.metrics.duration,
            result.metrics.throughput_mbps,
            result.metrics.io_operations,
            result.metrics.peak_memory_bytes
        );

        Ok(result.digests)
    }
}

impl Default for HashCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a file with every requested algorithm at the given capacity
pub async fn hash_file(
    source: &dyn FileSource,
    algorithms: &[HashAlgorithm],
    capacity: CapacityBound,
) -> Result<DigestResult> {
    HashCalculator::with_capacity(capacity)
        .hash_file(source, algorithms)
        .await
}
