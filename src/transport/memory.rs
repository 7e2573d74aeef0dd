use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;

use super::{BodyStream, Transport};
use crate::error::TransportError;

const DEFAULT_CHUNK: usize = 4096;

/// In-memory resource served by [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct MemoryResource {
    data: Bytes,
    chunk_size: usize,
    delay: Option<Duration>,
}

impl MemoryResource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk_size: DEFAULT_CHUNK,
            delay: None,
        }
    }

    /// Size of each chunk handed out by the body stream.
    pub fn chunked(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sleeps this long before every chunk (and once per ranged read).
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Transport backed by a fixed map of targets, used by tests and benches.
///
/// Counts opens and bytes handed out so callers can check how much of each
/// resource was actually read.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    resources: HashMap<String, MemoryResource>,
    multiplexing: bool,
    opens: Arc<AtomicUsize>,
    bytes_served: Arc<AtomicUsize>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
            multiplexing: true,
            opens: Arc::default(),
            bytes_served: Arc::default(),
        }
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, target: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.with_resource(target, MemoryResource::new(data))
    }

    pub fn with_resource(mut self, target: impl Into<String>, resource: MemoryResource) -> Self {
        self.resources.insert(target.into(), resource);
        self
    }

    pub fn without_multiplexing(mut self) -> Self {
        self.multiplexing = false;
        self
    }

    /// Number of `open` and `read_range` calls served so far.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn bytes_served(&self) -> usize {
        self.bytes_served.load(Ordering::Relaxed)
    }

    fn lookup(&self, target: &str) -> Result<&MemoryResource, TransportError> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        self.resources
            .get(target)
            .ok_or_else(|| TransportError::NotFound(target.to_string()))
    }
}

impl Transport for MemoryTransport {
    type Body = MemoryBody;

    async fn open(&self, target: &str, limit: usize) -> Result<MemoryBody, TransportError> {
        let resource = self.lookup(target)?;
        let end = limit.min(resource.data.len());

        Ok(MemoryBody {
            data: resource.data.slice(..end),
            pos: 0,
            chunk_size: resource.chunk_size,
            delay: resource.delay,
            served: Arc::clone(&self.bytes_served),
        })
    }

    async fn read_range(&self, target: &str, range: Range<usize>) -> Result<Bytes, TransportError> {
        let resource = self.lookup(target)?;
        if let Some(delay) = resource.delay {
            tokio::time::sleep(delay).await;
        }

        let len = resource.data.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.bytes_served.fetch_add(end - start, Ordering::Relaxed);
        Ok(resource.data.slice(start..end))
    }

    fn supports_multiplexing(&self) -> bool {
        self.multiplexing
    }
}

#[derive(Debug)]
pub struct MemoryBody {
    data: Bytes,
    pos: usize,
    chunk_size: usize,
    delay: Option<Duration>,
    served: Arc<AtomicUsize>,
}

impl BodyStream for MemoryBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.pos..end);
        self.pos = end;
        self.served.fetch_add(chunk.len(), Ordering::Relaxed);
        Ok(Some(chunk))
    }
}
