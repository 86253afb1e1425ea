//! Mock implementations for testing

mod file_source;
mod progress;

pub use file_source::{MockCounters, MockFileSource};
pub use progress::RecordingProvider;
