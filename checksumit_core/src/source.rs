//! Byte sources that can be hashed
//!
//! A [`FileSource`] knows its total size, can be opened for sequential reads
//! and can be read whole in a single operation. [`LocalFile`] is the
//! filesystem-backed implementation; front ends and tests may supply their own.

use crate::{Error, Result, error::IoError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Sequential byte stream returned by [`FileSource::open`]
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Readable byte source with a known total size
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Name used in results, logs and error messages
    fn name(&self) -> &str;

    /// Total size in bytes
    async fn size(&self) -> Result<u64>;

    /// Open the source for sequential reading
    async fn open(&self) -> Result<ByteStream>;

    /// Read the whole source into memory
    async fn read_all(&self) -> Result<Vec<u8>> {
        let mut stream = self.open().await?;
        let mut buffer = Vec::new();
        stream
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| IoError::read_failure(Path::new(self.name()), e))?;
        Ok(buffer)
    }
}

/// File on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    /// Create a source for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_error(&self, source: std::io::Error) -> Error {
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::Io(IoError::file_not_found(&self.path)),
            std::io::ErrorKind::PermissionDenied => {
                Error::Io(IoError::permission_denied(&self.path, source))
            }
            _ => Error::Io(IoError::from_std(source).with_path(&self.path)),
        }
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn size(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| self.open_error(e))?;
        // Pipes and devices report no usable length
        if !metadata.is_file() {
            return Err(Error::Io(IoError::not_regular_file(&self.path)));
        }
        Ok(metadata.len())
    }

    async fn open(&self) -> Result<ByteStream> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| self.open_error(e))?;
        Ok(Box::new(file))
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(data),
            Err(e) if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ) =>
            {
                Err(self.open_error(e))
            }
            Err(e) => Err(Error::Io(IoError::read_failure(&self.path, e))),
        }
    }
}
