//! Failure behavior: validation before I/O, no partial results, isolation

use checksumit_core::{
    BatchProcessor, CancellationFlag, CapacityBound, Error, HashAlgorithm, HashCalculator,
    HashMode, HashOptions, LocalFile, MIB, NullProvider,
    error::{IoErrorKind, ValidationError},
};
use checksumit_test_utils::{
    MockFileSource, RecordingProvider, TestFileBuilder, patterned_content,
};

fn calculator() -> HashCalculator {
    HashCalculator::with_capacity(CapacityBound::MIN)
}

#[tokio::test]
async fn test_unsupported_name_fails_before_any_io() {
    let source = MockFileSource::new("untouched.bin", b"content".to_vec());
    let counters = source.counters();

    let err = calculator()
        .hash_file_by_names(&source, &["MD5", "CRC32"])
        .await
        .unwrap_err();

    match err {
        Error::Validation(ValidationError::UnsupportedAlgorithm { name }) => {
            assert_eq!(name, "CRC32")
        }
        other => panic!("Expected UnsupportedAlgorithm, got {other:?}"),
    }
    assert_eq!(counters.size_queries(), 0);
    assert_eq!(counters.content_accesses(), 0);
}

#[tokio::test]
async fn test_read_failure_while_streaming_yields_no_digests() {
    let source = MockFileSource::new("broken.bin", patterned_content(3 * MIB as usize, 3))
        .failing_after(MIB as usize + 10);

    let err = calculator()
        .hash_file(&source, &HashAlgorithm::ALL)
        .await
        .unwrap_err();

    match err {
        Error::Io(io) => {
            assert_eq!(io.kind, IoErrorKind::ReadFailure);
            assert!(io.to_string().contains("broken.bin"));
        }
        other => panic!("Expected read failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_read_failure_while_buffered_yields_no_digests() {
    let source = MockFileSource::new("broken-small.bin", vec![1u8; 100]).failing_after(50);
    let calculator = calculator();

    let err = calculator
        .hash_file(&source, &[HashAlgorithm::SHA1])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(ref io) if io.kind == IoErrorKind::ReadFailure));
    assert_eq!(calculator.memory_tracker().used(), 0);
}

#[tokio::test]
async fn test_empty_algorithm_list_never_reads() {
    let source = MockFileSource::new("skip.bin", vec![0u8; 10]);
    let counters = source.counters();

    let result = calculator().hash_file(&source, &[]).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.input_size, 10);
    assert_eq!(counters.content_accesses(), 0);
}

#[tokio::test]
async fn test_cancellation_between_chunks() {
    let source = MockFileSource::new("cancel.bin", patterned_content(4 * MIB as usize, 11));
    let counters = source.counters();
    let flag = CancellationFlag::new();
    flag.cancel();

    let err = calculator()
        .hash_file_with_options(
            &source,
            &[HashAlgorithm::MD5],
            HashOptions::default().with_cancellation(&flag),
        )
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(counters.reads(), 0);
}

#[tokio::test]
async fn test_streaming_progress_reports_every_chunk() {
    let size = 2 * MIB as usize + 5;
    let source = MockFileSource::new("progress.bin", patterned_content(size, 2));
    let provider = RecordingProvider::new();

    calculator()
        .hash_file_with_options(
            &source,
            &[HashAlgorithm::SHA256],
            HashOptions::default().with_progress(&provider),
        )
        .await
        .unwrap();

    let progress = provider.hash_progress(checksumit_core::HashMode::Streaming);
    assert_eq!(
        progress,
        vec![
            (MIB, size as u64),
            (2 * MIB, size as u64),
            (size as u64, size as u64)
        ]
    );
}

#[tokio::test]
async fn test_batch_failures_are_isolated() {
    let sources = vec![
        MockFileSource::new("a.bin", b"abc".to_vec()),
        MockFileSource::new("b.bin", patterned_content(2 * MIB as usize, 4)).failing_after(100),
        MockFileSource::new("c.bin", patterned_content(2 * MIB as usize, 5)),
        MockFileSource::new("d.bin", Vec::new()).failing_after(0),
    ];
    let provider = RecordingProvider::new();
    let processor = BatchProcessor::new(calculator(), 3);

    let result = processor
        .process_by_names(&sources, &["MD5", "SHA-256"], &provider, None)
        .await
        .unwrap();

    assert_eq!(result.total_files, 4);
    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 2);

    let outcomes: Vec<(&str, bool)> = result
        .results
        .iter()
        .map(|o| (o.name.as_str(), o.is_success()))
        .collect();
    assert_eq!(
        outcomes,
        vec![("a.bin", true), ("b.bin", false), ("c.bin", true), ("d.bin", false)]
    );

    let a = result.results[0].result.as_ref().unwrap();
    assert_eq!(a.hex_digests()[0], "900150983cd24fb0d6963f7d28e17f72");

    let mut batch_steps = provider.batch_progress();
    batch_steps.sort_unstable();
    assert_eq!(batch_steps, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_batch_cancellation_marks_every_file() {
    let sources: Vec<MockFileSource> = (0..3)
        .map(|i| MockFileSource::new(&format!("{i}.bin"), patterned_content(2 * MIB as usize, i)))
        .collect();
    let flag = CancellationFlag::new();
    flag.cancel();

    let result = BatchProcessor::new(calculator(), 2)
        .process(&sources, &[HashAlgorithm::SHA1], &NullProvider, Some(&flag))
        .await;

    assert_eq!(result.failed, 3);
    assert!(
        result
            .results
            .iter()
            .all(|o| o.result.as_ref().is_err_and(|e| e.is_cancelled()))
    );
}

#[tokio::test]
async fn test_batch_over_local_files_with_missing_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut builder = TestFileBuilder::new(dir.path());
    assert!(builder.is_ready());

    let large_size = 2 * MIB as usize + 1;
    let large = builder.source("large.bin", large_size, 3).unwrap();
    let small = builder.source("nested/small.bin", 100, 4).unwrap();
    let missing = LocalFile::new(dir.path().join("missing.bin"));
    assert_eq!(builder.generated_files().len(), 2);

    let algorithms = [HashAlgorithm::SHA256, HashAlgorithm::MD5];
    let processor = BatchProcessor::new(calculator(), 2);
    let batch = processor
        .process(
            &[large, missing, small],
            &algorithms,
            &NullProvider,
            None,
        )
        .await;

    assert_eq!(batch.total_files, 3);
    assert_eq!(batch.successful, 2);
    assert_eq!(batch.failed, 1);

    let large_result = batch.results[0].result.as_ref().unwrap();
    assert_eq!(large_result.mode, HashMode::Streaming);
    let expected = calculator().hash_bytes(&patterned_content(large_size, 3), &algorithms);
    assert_eq!(large_result.hex_digests(), expected.hex_digests());

    match &batch.results[1].result {
        Err(Error::Io(e)) => assert_eq!(e.kind, IoErrorKind::FileNotFound),
        other => panic!("Expected file not found, got {other:?}"),
    }

    let small_result = batch.results[2].result.as_ref().unwrap();
    assert_eq!(small_result.mode, HashMode::Buffered);
    assert_eq!(batch.results[2].size, Some(100));
}
