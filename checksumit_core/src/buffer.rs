//! Buffer management module with memory tracking
//!
//! Whole-file buffers and streaming chunk buffers are accounted here so the
//! bytes held by in-flight hashing operations can be observed and bounded.

use crate::capacity::MemorySource;
use crate::{Error, Result, error::InternalError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory tracker for managing memory allocation limits
#[derive(Debug, Clone)]
pub struct MemoryTracker {
    /// Current memory usage
    memory_used: Arc<AtomicUsize>,
    /// Memory limit
    memory_limit: usize,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl MemoryTracker {
    /// Create a new memory tracker with the specified limit
    pub fn new(limit: usize) -> Self {
        Self {
            memory_used: Arc::new(AtomicUsize::new(0)),
            memory_limit: limit,
        }
    }

    /// Create a tracker that only counts, never refuses
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Get the current memory limit
    pub fn limit(&self) -> usize {
        self.memory_limit
    }

    /// Get current memory usage
    pub fn used(&self) -> usize {
        self.memory_used.load(Ordering::Relaxed)
    }

    /// Account for `size` bytes without allocating them
    pub fn reserve(&self, size: usize) -> Result<()> {
        let mut old_value = self.memory_used.load(Ordering::Relaxed);
        loop {
            let new_value = old_value.saturating_add(size);
            if new_value > self.memory_limit {
                return Err(Error::Internal(InternalError::memory_limit_exceeded(
                    self.memory_limit,
                    new_value,
                )));
            }

            match self.memory_used.compare_exchange_weak(
                old_value,
                new_value,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(x) => old_value = x,
            }
        }
    }

    /// Give back bytes previously taken with [`MemoryTracker::reserve`]
    pub fn unreserve(&self, size: usize) {
        // Saturating so a double release can never wrap the counter
        let _ = self
            .memory_used
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(size))
            });
    }

    /// Allocate a zeroed buffer with memory tracking
    pub fn allocate(&self, size: usize) -> Result<Vec<u8>> {
        self.reserve(size)?;
        Ok(vec![0u8; size])
    }

    /// Release a buffer and update memory tracking
    pub fn release(&self, buffer: Vec<u8>) {
        let size = buffer.len();
        drop(buffer);
        self.unreserve(size);
    }

    /// Reset memory tracking (mainly for tests)
    #[cfg(test)]
    pub fn reset(&self) {
        self.memory_used.store(0, Ordering::Relaxed);
    }
}

impl MemorySource for MemoryTracker {
    fn limit(&self) -> u64 {
        self.memory_limit as u64
    }

    fn in_use(&self) -> u64 {
        self.used() as u64
    }
}
