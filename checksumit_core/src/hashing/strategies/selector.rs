//! Strategy selection
//!
//! A file whose size is at most the planned capacity is hashed buffered;
//! anything larger is streamed. The boundary is inclusive.

use super::{BufferedStrategy, HashingContext, HashingStrategy, StreamingStrategy};
use crate::capacity::CapacityBound;
use crate::hashing::HashMode;
use log::trace;

/// Selector for choosing between buffered and streaming hashing
#[derive(Debug, Default)]
pub struct StrategySelector {
    buffered: BufferedStrategy,
    streaming: StreamingStrategy,
}

impl StrategySelector {
    /// Create a new strategy selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode for a file of `file_size` bytes under `capacity`
    pub fn mode_for(file_size: u64, capacity: CapacityBound) -> HashMode {
        if capacity.fits(file_size) {
            HashMode::Buffered
        } else {
            HashMode::Streaming
        }
    }

    /// Select the strategy for the given context
    pub fn select(&self, context: &HashingContext<'_>) -> &dyn HashingStrategy {
        let strategy: &dyn HashingStrategy =
            match Self::mode_for(context.file_size, context.capacity) {
                HashMode::Buffered => &self.buffered,
                HashMode::Streaming => &self.streaming,
            };

        trace!(
            "Selected {} strategy for {} ({} bytes, capacity {})",
            strategy.name(),
            context.source.name(),
            context.file_size,
            context.capacity
        );
        debug_assert!(strategy.is_suitable(context));

        strategy
    }
}
