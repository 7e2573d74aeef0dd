//! Byte sources the dispatcher reads from.
//!
//! A [`Transport`] offers two ways in: [`Transport::open`] hands out a
//! stream that the concurrent dispatcher polls alongside every other open
//! target, and [`Transport::read_range`] performs one self-contained partial
//! read for the sequential fallback. Which one a batch uses is decided once,
//! up front, by a [`ModeProbe`].

pub mod http;
pub mod memory;

use std::future::Future;
use std::ops::Range;

use bytes::{Bytes, BytesMut};

use crate::error::TransportError;

pub use http::{HttpBody, HttpTransport};
pub use memory::{MemoryBody, MemoryResource, MemoryTransport};

/// Body of an opened target, yielding chunks in order until `None`.
pub trait BodyStream: Send {
    fn next_chunk(&mut self)
    -> impl Future<Output = Result<Option<Bytes>, TransportError>> + Send;
}

pub trait Transport: Send + Sync {
    type Body: BodyStream;

    /// Opens `target` from its first byte. `limit` is the most the caller will
    /// ever consume and may be forwarded to the remote end.
    fn open(
        &self,
        target: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Self::Body, TransportError>> + Send;

    /// Reads `range` of `target` in one call. Fewer bytes than requested
    /// means the resource ended.
    fn read_range(
        &self,
        target: &str,
        range: Range<usize>,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send {
        async move {
            if range.is_empty() {
                return Ok(Bytes::new());
            }
            let mut body = self.open(target, range.end).await?;
            collect(&mut body, range.start, range.len()).await
        }
    }

    /// Whether many bodies may be polled from one control loop.
    fn supports_multiplexing(&self) -> bool {
        true
    }
}

/// How a batch drives its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// All targets share one control loop, reads interleaved as data arrives.
    Concurrent,
    /// One target at a time, each growth step a separate ranged read.
    Sequential,
}

/// Chooses the [`DispatchMode`] at the start of each batch.
pub trait ModeProbe: Send + Sync {
    fn probe(&self) -> DispatchMode;
}

impl ModeProbe for DispatchMode {
    fn probe(&self) -> DispatchMode {
        *self
    }
}

const MAX_PREALLOC: usize = 64 * 1024;

/// Drains `body`, discarding the first `skip` bytes and keeping at most `len`.
pub async fn collect<B: BodyStream>(
    body: &mut B,
    mut skip: usize,
    len: usize,
) -> Result<Bytes, TransportError> {
    let mut out = BytesMut::with_capacity(len.min(MAX_PREALLOC));

    while out.len() < len {
        let Some(mut chunk) = body.next_chunk().await? else {
            break;
        };
        if skip >= chunk.len() {
            skip -= chunk.len();
            continue;
        }
        if skip > 0 {
            chunk = chunk.slice(skip..);
            skip = 0;
        }
        let take = chunk.len().min(len - out.len());
        out.extend_from_slice(&chunk[..take]);
    }

    Ok(out.freeze())
}
