//! Hash algorithm implementations
//!
//! Every supported algorithm is backed by a RustCrypto hasher; the mapping from
//! [`HashAlgorithm`] to implementation is a compile-time `match`.

use super::HashAlgorithm;
use super::traits::StreamingHasher;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Streaming hasher over any RustCrypto [`Digest`]
struct DigestHasher<D> {
    hasher: D,
}

impl<D: Digest> DigestHasher<D> {
    fn new() -> Self {
        Self { hasher: D::new() }
    }
}

impl<D: Digest + Send> StreamingHasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(self.hasher).to_vec()
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Create a fresh hasher for the algorithm
pub(crate) fn create_hasher(algorithm: HashAlgorithm) -> Box<dyn StreamingHasher> {
    match algorithm {
        HashAlgorithm::MD5 => Box::new(DigestHasher::<Md5>::new()),
        HashAlgorithm::SHA1 => Box::new(DigestHasher::<Sha1>::new()),
        HashAlgorithm::SHA256 => Box::new(DigestHasher::<Sha256>::new()),
        HashAlgorithm::SHA384 => Box::new(DigestHasher::<Sha384>::new()),
        HashAlgorithm::SHA512 => Box::new(DigestHasher::<Sha512>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(algorithm: HashAlgorithm, data: &[u8]) -> String {
        let mut hasher = create_hasher(algorithm);
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    #[test]
    fn test_abc_vectors() {
        assert_eq!(
            hex_of(HashAlgorithm::MD5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hex_of(HashAlgorithm::SHA1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex_of(HashAlgorithm::SHA256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex_of(HashAlgorithm::SHA384, b"abc"),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7"
        );
        assert_eq!(
            hex_of(HashAlgorithm::SHA512, b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_output_sizes_match_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let hasher = create_hasher(algorithm);
            assert_eq!(hasher.output_size(), algorithm.digest_len());
        }
    }

    #[test]
    fn test_split_updates_match_single_update() {
        let data = b"The quick brown fox jumps over the lazy dog";
        for algorithm in HashAlgorithm::ALL {
            let mut split = create_hasher(algorithm);
            split.update(&data[..7]);
            split.update(&data[7..]);
            assert_eq!(hex::encode(split.finalize()), hex_of(algorithm, data));
        }
    }
}
