//! Concurrent hashing of many files
//!
//! Files are hashed with bounded concurrency. Each file gets its own hash
//! states, so a failure on one file never touches another. Results come back
//! in input order regardless of completion order.
//!
//! The calculator's capacity is the memory budget of the whole batch: it is
//! split evenly between the files in flight, and concurrency is lowered when
//! the budget cannot give every file at least the minimum capacity.

use crate::cancellation::CancellationFlag;
use crate::capacity::{CapacityBound, MIN_CAPACITY};
use crate::hashing::{DigestResult, HashAlgorithm, HashCalculator, HashOptions};
use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::source::FileSource;
use crate::{Error, Result, error::InternalError};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Outcome of hashing one file of a batch
#[derive(Debug)]
pub struct FileOutcome {
    /// Display name of the source
    pub name: String,
    /// Bytes hashed, when hashing succeeded
    pub size: Option<u64>,
    /// Digests or the error that aborted this file
    pub result: Result<DigestResult>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of batch processing
#[derive(Debug)]
pub struct BatchResult {
    /// Total files to process
    pub total_files: usize,
    /// Successfully processed files
    pub successful: usize,
    /// Failed files
    pub failed: usize,
    /// Total processing time
    pub total_time: Duration,
    /// Individual outcomes in input order
    pub results: Vec<FileOutcome>,
}

impl BatchResult {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Batch processor hashing several files at once
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    calculator: HashCalculator,
    budget: CapacityBound,
    max_concurrent_files: usize,
}

impl BatchProcessor {
    /// Create a processor sharing the calculator's capacity between files
    ///
    /// A concurrency of zero is treated as one.
    pub fn new(calculator: HashCalculator, max_concurrent_files: usize) -> Self {
        let budget = calculator.capacity();
        let fitting = usize::try_from(budget.bytes() / MIN_CAPACITY)
            .unwrap_or(usize::MAX)
            .max(1);
        let concurrency = max_concurrent_files.clamp(1, fitting);
        if concurrency < max_concurrent_files {
            debug!(
                "Capacity {budget} fits {concurrency} concurrent file(s), not {max_concurrent_files}"
            );
        }

        let per_file = CapacityBound::clamped(budget.bytes() / concurrency as u64);
        Self {
            calculator: calculator.with_capacity_bound(per_file),
            budget,
            max_concurrent_files: concurrency,
        }
    }

    /// Calculator used for each file, holding its share of the budget
    pub fn calculator(&self) -> &HashCalculator {
        &self.calculator
    }

    /// Bytes all files in flight may hold together
    pub fn capacity_budget(&self) -> CapacityBound {
        self.budget
    }

    pub fn max_concurrent_files(&self) -> usize {
        self.max_concurrent_files
    }

    /// Hash every source, resolving algorithm names before any file is opened
    pub async fn process_by_names<S, N>(
        &self,
        sources: &[S],
        names: &[N],
        progress_provider: &dyn ProgressProvider,
        cancel: Option<&CancellationFlag>,
    ) -> Result<BatchResult>
    where
        S: FileSource,
        N: AsRef<str>,
    {
        let algorithms = HashAlgorithm::parse_list(names)?;
        Ok(self
            .process(sources, &algorithms, progress_provider, cancel)
            .await)
    }

    /// Hash every source with the same algorithm list
    pub async fn process<S: FileSource>(
        &self,
        sources: &[S],
        algorithms: &[HashAlgorithm],
        progress_provider: &dyn ProgressProvider,
        cancel: Option<&CancellationFlag>,
    ) -> BatchResult {
        let start_time = Instant::now();
        let total_files = sources.len();
        let semaphore = Semaphore::new(self.max_concurrent_files);

        debug!(
            "Hashing {} file(s) with {} algorithm(s), {} at a time",
            total_files,
            algorithms.len(),
            self.max_concurrent_files
        );

        let mut futures = FuturesUnordered::new();
        for (index, source) in sources.iter().enumerate() {
            let semaphore = &semaphore;
            let child = progress_provider.create_child(source.name());

            futures.push(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => {
                        let mut options = HashOptions::default().with_progress(child.as_ref());
                        if let Some(flag) = cancel {
                            options = options.with_cancellation(flag);
                        }
                        self.calculator
                            .hash_file_with_options(source, algorithms, options)
                            .await
                    }
                    Err(_) => Err(Error::Internal(InternalError::assertion(
                        "Failed to acquire semaphore",
                    ))),
                };
                child.complete();
                (index, result)
            });
        }

        let mut slots: Vec<Option<FileOutcome>> = (0..total_files).map(|_| None).collect();
        let mut successful = 0usize;
        let mut failed = 0usize;

        while let Some((index, result)) = futures.next().await {
            let name = sources[index].name().to_string();
            match &result {
                Ok(_) => successful += 1,
                Err(e) => {
                    warn!("Failed to hash {name}: {e}");
                    failed += 1;
                }
            }

            progress_provider.report(ProgressUpdate::BatchProgress {
                current: successful + failed,
                total: total_files,
                current_file: Some(name.clone()),
            });

            slots[index] = Some(FileOutcome {
                size: result.as_ref().ok().map(|digests| digests.input_size),
                name,
                result,
            });
        }
        drop(futures);
        progress_provider.complete();

        BatchResult {
            total_files,
            successful,
            failed,
            total_time: start_time.elapsed(),
            results: slots.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProvider;
    use crate::source::LocalFile;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let mut sources = Vec::new();
        for i in 0..5 {
            let path = temp_dir.path().join(format!("file_{i}.bin"));
            std::fs::write(&path, vec![i as u8; 1000 * (i + 1)]).unwrap();
            sources.push(LocalFile::new(path));
        }
        sources.insert(2, LocalFile::new(temp_dir.path().join("missing.bin")));

        let processor =
            BatchProcessor::new(HashCalculator::with_capacity(CapacityBound::MIN), 2);
        let result = processor
            .process(&sources, &[HashAlgorithm::MD5], &NullProvider, None)
            .await;

        assert_eq!(result.total_files, 6);
        assert_eq!(result.successful, 5);
        assert_eq!(result.failed, 1);
        assert!(!result.all_succeeded());

        let names: Vec<String> = result
            .results
            .iter()
            .map(|o| {
                std::path::Path::new(&o.name)
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "file_0.bin",
                "file_1.bin",
                "missing.bin",
                "file_2.bin",
                "file_3.bin",
                "file_4.bin"
            ]
        );
        assert!(!result.results[2].is_success());
        assert_eq!(result.results[2].size, None);
        assert_eq!(result.results[3].size, Some(3000));
    }

    fn processor_with_budget(budget: CapacityBound, concurrency: usize) -> BatchProcessor {
        BatchProcessor::new(HashCalculator::with_capacity(budget), concurrency)
    }

    #[test]
    fn test_budget_is_split_between_files() {
        let processor = processor_with_budget(CapacityBound::from_mib(8), 4);
        assert_eq!(processor.max_concurrent_files(), 4);
        assert_eq!(processor.capacity_budget(), CapacityBound::from_mib(8));
        assert_eq!(processor.calculator().capacity(), CapacityBound::from_mib(2));

        let processor = processor_with_budget(CapacityBound::from_mib(3), 4);
        assert_eq!(processor.max_concurrent_files(), 3);
        assert_eq!(processor.calculator().capacity(), CapacityBound::MIN);

        let processor = processor_with_budget(CapacityBound::MIN, 4);
        assert_eq!(processor.max_concurrent_files(), 1);
        assert_eq!(processor.calculator().capacity(), CapacityBound::MIN);
    }

    #[test]
    fn test_uneven_budget_never_exceeds_total() {
        let budget = CapacityBound::clamped(10 * crate::capacity::MIB + 7);
        let processor = processor_with_budget(budget, 3);
        let per_file = processor.calculator().capacity().bytes();
        assert!(per_file * processor.max_concurrent_files() as u64 <= budget.bytes());
        assert!(per_file >= MIN_CAPACITY);
    }

    #[tokio::test]
    async fn test_batch_rejects_unknown_names_up_front() {
        let processor = BatchProcessor::new(HashCalculator::with_capacity(CapacityBound::MIN), 0);
        assert_eq!(processor.max_concurrent_files(), 1);

        let sources = vec![LocalFile::new("/nonexistent/a")];
        let err = processor
            .process_by_names(&sources, &["MD5", "whirlpool"], &NullProvider, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
