//! Progress rendering for the CLI
//!
//! Turns progress updates into indicatif bars: one byte bar per file being
//! hashed and one bar counting finished files.

use checksumit_core::{HashMode, ProgressUpdate};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use tokio::sync::mpsc;

use super::utils::format_duration_from_duration;
use crate::output::display_name;

/// Render progress updates from a channel
pub async fn render_progress(mut rx: mpsc::Receiver<ProgressUpdate>) {
    let mut renderer = ProgressRenderer::new();

    while let Some(update) = rx.recv().await {
        renderer.handle_update(update);
    }

    renderer.finish();
}

/// Progress renderer that manages visual progress display
pub struct ProgressRenderer {
    multi: MultiProgress,
    file_bars: HashMap<String, ProgressBar>,
    batch_bar: Option<ProgressBar>,
    started: std::time::Instant,
}

impl ProgressRenderer {
    /// Create a new progress renderer
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            file_bars: HashMap::new(),
            batch_bar: None,
            started: std::time::Instant::now(),
        }
    }

    /// Handle a progress update
    pub fn handle_update(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::HashProgress {
                source,
                mode,
                bytes_processed,
                total_bytes,
            } => {
                self.update_hash_progress(source, mode, bytes_processed, total_bytes);
            }

            ProgressUpdate::BatchProgress {
                current,
                total,
                current_file,
            } => {
                self.update_batch_progress(current, total, current_file);
            }

            ProgressUpdate::Status { message } => {
                self.show_status(message);
            }
        }
    }

    /// Number of file bars currently shown
    pub fn active_files(&self) -> usize {
        self.file_bars.len()
    }

    fn update_hash_progress(
        &mut self,
        source: String,
        mode: HashMode,
        bytes_processed: u64,
        total_bytes: u64,
    ) {
        let multi = &self.multi;
        let pb = self.file_bars.entry(source.clone()).or_insert_with(|| {
            let pb = multi.add(ProgressBar::new(total_bytes));
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% | {bytes}/{total_bytes} | {bytes_per_sec} | ETA: {eta}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(format!(
                "{}: {} [{}]",
                "Hashing".bold(),
                display_name(&source).cyan(),
                mode.to_string().yellow()
            ));
            pb
        });

        pb.set_length(total_bytes.max(bytes_processed));
        pb.set_position(bytes_processed);

        if bytes_processed >= total_bytes
            && let Some(pb) = self.file_bars.remove(&source)
        {
            pb.finish_and_clear();
        }
    }

    fn update_batch_progress(&mut self, current: usize, total: usize, current_file: Option<String>) {
        if total < 2 {
            return;
        }

        let multi = &self.multi;
        let bar = self.batch_bar.get_or_insert_with(|| {
            let bar = multi.insert(0, ProgressBar::new(total as u64));
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg}\n[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files | {percent}%")
            {
                bar.set_style(style.progress_chars("##-"));
            }
            bar.set_message("Hashing batch".bold().to_string());
            bar
        });

        bar.set_position(current as u64);
        if let Some(file) = current_file {
            bar.set_message(format!(
                "{}: {}",
                "Finished".bold(),
                display_name(&file).cyan()
            ));
        }
    }

    fn show_status(&self, message: String) {
        let _ = self.multi.println(format!("{} {}", "→".green(), message));
    }

    /// Finish all progress bars
    pub fn finish(self) {
        for (_, pb) in self.file_bars {
            pb.finish_and_clear();
        }

        if let Some(bar) = self.batch_bar {
            bar.finish_with_message(format!(
                "{} in {}",
                "✓ Batch complete".green(),
                format_duration_from_duration(self.started.elapsed())
            ));
        }
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}
