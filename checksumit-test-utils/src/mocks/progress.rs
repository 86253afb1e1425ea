//! Progress provider that records every update

use checksumit_core::{HashMode, ProgressProvider, ProgressUpdate};
use std::sync::{Arc, Mutex};

/// Progress provider collecting updates for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    updates: Arc<Mutex<Vec<ProgressUpdate>>>,
    completions: Arc<Mutex<usize>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received so far, children included
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// `(bytes_processed, total_bytes)` of hash progress updates in a mode
    pub fn hash_progress(&self, mode: HashMode) -> Vec<(u64, u64)> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::HashProgress {
                    mode: m,
                    bytes_processed,
                    total_bytes,
                    ..
                } if m == mode => Some((bytes_processed, total_bytes)),
                _ => None,
            })
            .collect()
    }

    /// `current` values of batch progress updates
    pub fn batch_progress(&self) -> Vec<usize> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::BatchProgress { current, .. } => Some(current),
                _ => None,
            })
            .collect()
    }

    /// Times `complete()` was called on this provider or a child
    pub fn completions(&self) -> usize {
        *self.completions.lock().unwrap()
    }
}

impl ProgressProvider for RecordingProvider {
    fn report(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update);
    }

    fn create_child(&self, _name: &str) -> Box<dyn ProgressProvider> {
        Box::new(self.clone())
    }

    fn complete(&self) {
        *self.completions.lock().unwrap() += 1;
    }
}
