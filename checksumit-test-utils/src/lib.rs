//! Test utilities for checksumit
//!
//! This crate provides mock byte sources, a recording progress provider and
//! test data builders for exercising the hashing core.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{KnownDigests, TestFileBuilder, patterned_content};
pub use mocks::{MockCounters, MockFileSource, RecordingProvider};
