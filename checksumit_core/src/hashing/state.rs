//! Per-request incremental hash state

use super::algorithms::create_hasher;
use super::traits::StreamingHasher;
use super::{DigestEntry, HashAlgorithm, encode_hex};
use std::fmt;

/// Incremental digest accumulator bound to one algorithm
///
/// A state is created for a single hashing request, fed chunks in order and
/// consumed by [`HashState::finalize`]. It is never shared between files.
pub struct HashState {
    algorithm: HashAlgorithm,
    hasher: Box<dyn StreamingHasher>,
    bytes_fed: u64,
}

impl HashState {
    /// Create a fresh state for the algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            hasher: create_hasher(algorithm),
            bytes_fed: 0,
        }
    }

    /// Algorithm this state computes
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Total bytes fed so far
    pub fn bytes_fed(&self) -> u64 {
        self.bytes_fed
    }

    /// Feed the next chunk of input
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes_fed += chunk.len() as u64;
    }

    /// Consume the state and return the raw digest
    pub fn finalize(self) -> Vec<u8> {
        self.hasher.finalize()
    }

    /// Consume the state and return the lowercase hex digest
    pub fn finalize_hex(self) -> String {
        encode_hex(&self.finalize())
    }

    /// Consume the state into an entry of a [`super::DigestResult`]
    pub fn finalize_entry(self) -> DigestEntry {
        let algorithm = self.algorithm;
        DigestEntry {
            algorithm,
            hex: self.finalize_hex(),
        }
    }
}

impl fmt::Debug for HashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashState")
            .field("algorithm", &self.algorithm)
            .field("bytes_fed", &self.bytes_fed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_digests_empty_input() {
        let state = HashState::new(HashAlgorithm::MD5);
        assert_eq!(state.bytes_fed(), 0);
        assert_eq!(state.finalize_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_bytes_fed_accumulates() {
        let mut state = HashState::new(HashAlgorithm::SHA256);
        state.update(b"hello ");
        state.update(b"world");
        assert_eq!(state.bytes_fed(), 11);
        assert_eq!(state.algorithm(), HashAlgorithm::SHA256);
    }

    #[test]
    fn test_digest_length_per_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let mut state = HashState::new(algorithm);
            state.update(b"length check");
            assert_eq!(state.finalize().len(), algorithm.digest_len());
        }
    }

    #[test]
    fn test_independent_states_do_not_leak() {
        // Two states for the same algorithm must not see each other's input
        let mut first = HashState::new(HashAlgorithm::SHA1);
        first.update(b"first file contents");
        let _ = first.finalize();

        let second = HashState::new(HashAlgorithm::SHA1);
        assert_eq!(
            second.finalize_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_finalize_entry() {
        let mut state = HashState::new(HashAlgorithm::SHA1);
        state.update(b"abc");
        let entry = state.finalize_entry();
        assert_eq!(entry.algorithm, HashAlgorithm::SHA1);
        assert_eq!(entry.hex, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
