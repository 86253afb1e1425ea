//! Progress reporting module for the CLI
//!
//! Bridges the core library's progress updates to indicatif bars rendered on
//! stderr by a separate task.

pub mod provider;
pub mod renderer;
pub mod utils;

pub use provider::{ChannelProvider, create_progress_infrastructure};
pub use renderer::{ProgressRenderer, render_progress};
pub use utils::{format_bytes, format_duration, format_throughput, throughput};
