//! In-memory file source with I/O counters and failure injection

use async_trait::async_trait;
use checksumit_core::{ByteStream, Error, FileSource, Result, error::IoError};
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// I/O counters shared by a [`MockFileSource`] and its clones
#[derive(Debug, Default)]
pub struct MockCounters {
    size_queries: AtomicUsize,
    opens: AtomicUsize,
    reads: AtomicUsize,
    read_all_calls: AtomicUsize,
}

impl MockCounters {
    /// Calls to `size()`
    pub fn size_queries(&self) -> usize {
        self.size_queries.load(Ordering::SeqCst)
    }

    /// Calls to `open()`
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Reads issued on opened streams
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Calls to `read_all()`
    pub fn read_all_calls(&self) -> usize {
        self.read_all_calls.load(Ordering::SeqCst)
    }

    /// Any operation that touched the content
    pub fn content_accesses(&self) -> usize {
        self.opens() + self.reads() + self.read_all_calls()
    }
}

/// Mock byte source backed by memory
#[derive(Debug, Clone)]
pub struct MockFileSource {
    name: String,
    content: Arc<Vec<u8>>,
    reported_size: Option<u64>,
    fail_after: Option<usize>,
    max_read: Option<usize>,
    counters: Arc<MockCounters>,
}

impl MockFileSource {
    /// Create a new mock source with the given content
    pub fn new(name: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.to_string(),
            content: Arc::new(content.into()),
            reported_size: None,
            fail_after: None,
            max_read: None,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Fail with an I/O error once `offset` bytes have been delivered
    pub fn failing_after(mut self, offset: usize) -> Self {
        self.fail_after = Some(offset);
        self
    }

    /// Deliver at most `max` bytes per read
    pub fn with_max_read(mut self, max: usize) -> Self {
        self.max_read = Some(max.max(1));
        self
    }

    /// Report a size different from the real content length
    pub fn with_reported_size(mut self, size: u64) -> Self {
        self.reported_size = Some(size);
        self
    }

    /// Counters shared with every clone of this source
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }

    /// Content this source serves
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    fn injected_error() -> io::Error {
        io::Error::other("injected read failure")
    }
}

#[async_trait]
impl FileSource for MockFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn size(&self) -> Result<u64> {
        self.counters.size_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .reported_size
            .unwrap_or(self.content.len() as u64))
    }

    async fn open(&self) -> Result<ByteStream> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            content: Arc::clone(&self.content),
            position: 0,
            fail_after: self.fail_after,
            max_read: self.max_read,
            counters: Arc::clone(&self.counters),
        }))
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        self.counters.read_all_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_after {
            Some(limit) if limit <= self.content.len() => Err(Error::Io(IoError::read_failure(
                Path::new(&self.name),
                Self::injected_error(),
            ))),
            _ => Ok(self.content.to_vec()),
        }
    }
}

struct MockStream {
    content: Arc<Vec<u8>>,
    position: usize,
    fail_after: Option<usize>,
    max_read: Option<usize>,
    counters: Arc<MockCounters>,
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.counters.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(limit) = this.fail_after
            && this.position >= limit
        {
            return Poll::Ready(Err(MockFileSource::injected_error()));
        }

        let remaining = this.content.len() - this.position;
        let mut n = remaining.min(buf.remaining());
        if let Some(max) = this.max_read {
            n = n.min(max);
        }
        if let Some(limit) = this.fail_after {
            n = n.min(limit - this.position);
        }

        buf.put_slice(&this.content[this.position..this.position + n]);
        this.position += n;
        Poll::Ready(Ok(()))
    }
}
