//! Progress provider implementation for CLI
//!
//! Sends progress updates through a channel to the rendering task, so hashing
//! never waits on the terminal.

use checksumit_core::{ProgressProvider, ProgressUpdate};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Channel-based progress provider for CLI rendering
pub struct ChannelProvider {
    tx: Mutex<Option<mpsc::Sender<ProgressUpdate>>>,
    name: Option<String>,
}

impl ChannelProvider {
    /// Create a new channel provider
    pub fn new(tx: mpsc::Sender<ProgressUpdate>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            name: None,
        }
    }

    /// Create a new channel provider with a name
    pub fn with_name(tx: mpsc::Sender<ProgressUpdate>, name: String) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            name: Some(name),
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<ProgressUpdate>> {
        self.tx.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ProgressProvider for ChannelProvider {
    fn report(&self, update: ProgressUpdate) {
        let update = match (&self.name, update) {
            (Some(name), ProgressUpdate::Status { message }) => ProgressUpdate::Status {
                message: format!("[{name}] {message}"),
            },
            (_, other) => other,
        };

        // Dropped when the renderer lags; the next update supersedes it
        if let Some(tx) = self.sender() {
            let _ = tx.try_send(update);
        }
    }

    fn create_child(&self, name: &str) -> Box<dyn ProgressProvider> {
        let child_name = match &self.name {
            Some(parent_name) => format!("{parent_name}/{name}"),
            None => name.to_string(),
        };
        match self.sender() {
            Some(tx) => Box::new(ChannelProvider::with_name(tx, child_name)),
            None => Box::new(ChannelProvider {
                tx: Mutex::new(None),
                name: Some(child_name),
            }),
        }
    }

    fn complete(&self) {
        // Drop our sender so the renderer can exit its loop
        if let Ok(mut guard) = self.tx.lock() {
            *guard = None;
        }
    }
}

/// Create a progress provider and renderer pair for CLI operations
pub fn create_progress_infrastructure()
-> (Arc<dyn ProgressProvider>, mpsc::Receiver<ProgressUpdate>) {
    let (tx, rx) = mpsc::channel(256);
    let provider = Arc::new(ChannelProvider::new(tx)) as Arc<dyn ProgressProvider>;
    (provider, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_closes_after_every_provider_completes() {
        let (provider, mut rx) = create_progress_infrastructure();
        let child = provider.create_child("file.bin");

        child.report(ProgressUpdate::Status {
            message: "started".to_string(),
        });
        child.complete();
        provider.complete();
        drop(child);

        match rx.recv().await {
            Some(ProgressUpdate::Status { message }) => assert_eq!(message, "[file.bin] started"),
            other => panic!("Expected status update, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_report_after_complete_is_ignored() {
        let (provider, mut rx) = create_progress_infrastructure();
        provider.complete();
        provider.report(ProgressUpdate::Status {
            message: "late".to_string(),
        });
        assert!(rx.recv().await.is_none());
    }
}
