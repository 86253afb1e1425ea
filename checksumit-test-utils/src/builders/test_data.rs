//! Test data builders for creating hashing scenarios

use checksumit_core::{Error, HashAlgorithm, LocalFile, Result, error::IoError};
use std::path::{Path, PathBuf};

/// Deterministic pseudo-random content of `size` bytes derived from `seed`
pub fn patterned_content(size: usize, seed: u64) -> Vec<u8> {
    let mut current = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut content = Vec::with_capacity(size);

    for _ in 0..size {
        content.push((current >> 24) as u8);
        current = current.wrapping_mul(1664525).wrapping_add(1013904223);
    }

    content
}

/// Published digests for well-known inputs
pub struct KnownDigests;

impl KnownDigests {
    /// Digest of the empty input
    pub fn empty(algorithm: HashAlgorithm) -> &'static str {
        match algorithm {
            HashAlgorithm::MD5 => "d41d8cd98f00b204e9800998ecf8427e",
            HashAlgorithm::SHA1 => "da39a3ee5e6b4b0d3255bfef95601890afd80709",
            HashAlgorithm::SHA256 => {
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            }
            HashAlgorithm::SHA384 => {
                "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b"
            }
            HashAlgorithm::SHA512 => {
                "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
            }
        }
    }

    /// Digest of the three bytes `abc`
    pub fn abc(algorithm: HashAlgorithm) -> &'static str {
        match algorithm {
            HashAlgorithm::MD5 => "900150983cd24fb0d6963f7d28e17f72",
            HashAlgorithm::SHA1 => "a9993e364706816aba3e25717850c26c9cd0d89d",
            HashAlgorithm::SHA256 => {
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            }
            HashAlgorithm::SHA384 => {
                "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7"
            }
            HashAlgorithm::SHA512 => {
                "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
            }
        }
    }
}

/// Builder writing test files into a directory
pub struct TestFileBuilder {
    base_dir: PathBuf,
    generated_files: Vec<PathBuf>,
}

impl TestFileBuilder {
    /// Create a new test file builder
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            generated_files: Vec::new(),
        }
    }

    /// Check if the builder is ready to use
    pub fn is_ready(&self) -> bool {
        self.base_dir.is_dir()
    }

    /// Write a file with the given content
    pub fn file(&mut self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let file_path = self.base_dir.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(IoError::from_std(e).with_path(parent)))?;
        }
        std::fs::write(&file_path, content)
            .map_err(|e| Error::Io(IoError::from_std(e).with_path(&file_path)))?;

        self.generated_files.push(file_path.clone());
        Ok(file_path)
    }

    /// Write a deterministic file with specific size and seed
    pub fn deterministic_file(&mut self, name: &str, size: usize, seed: u64) -> Result<PathBuf> {
        self.file(name, &patterned_content(size, seed))
    }

    /// Write a deterministic file and wrap it as a source
    pub fn source(&mut self, name: &str, size: usize, seed: u64) -> Result<LocalFile> {
        self.deterministic_file(name, size, seed).map(LocalFile::new)
    }

    /// Files written so far
    pub fn generated_files(&self) -> &[PathBuf] {
        &self.generated_files
    }
}
