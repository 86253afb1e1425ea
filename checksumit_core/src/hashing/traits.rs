//! Core traits for incremental hash computation

/// Trait for streaming hash calculation
pub trait StreamingHasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash calculation and return the raw digest bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Length of the digest in bytes
    fn output_size(&self) -> usize;
}
