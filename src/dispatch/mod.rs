//! Per-target request lifecycle and the two batch drivers.
//!
//! Every target owns a [`Request`] that walks
//! `Pending -> Reading -> Parsing -> {Done | Failed}`. Both drivers grow the
//! buffer the same way, so for the same bytes they inspect the same prefixes
//! and reach the same verdict:
//!
//! - start with `initial_window` bytes
//! - on `NeedMoreBytes(n)` ask for `n` more, clamped to `max_buffer`
//! - a buffer that already holds `max_buffer` bytes fails as over the cap
//! - a stream that ends short of the request fails as truncated

pub mod concurrent;
pub mod sequential;

use std::future::Future;
use std::ops::Range;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::error::{ProbeError, TransportError};
use crate::sniffer::sniff;
use crate::transport::{BodyStream, Transport};
use crate::types::{ImageMeta, ParseOutcome};

pub use concurrent::run_concurrent;
pub use sequential::run_sequential;

/// Outcome of one target, in input order.
pub type Outcome = (String, Result<ImageMeta, ProbeError>);

/// Per-batch read limits, copied out of [`EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub initial_window: usize,
    pub max_buffer: usize,
    pub timeout: Duration,
}

impl Limits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            initial_window: config.initial_window.min(config.max_buffer).max(1),
            max_buffer: config.max_buffer.max(1),
            timeout: config.timeout(),
        }
    }
}

impl From<&EngineConfig> for Limits {
    fn from(config: &EngineConfig) -> Self {
        Self::from_config(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Reading,
    Parsing,
    Done,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Done | RequestState::Failed)
    }
}

/// Mutable state for one target during a batch.
#[derive(Debug)]
pub struct Request {
    target: String,
    buffer: BytesMut,
    requested: usize,
    state: RequestState,
    deadline: Option<Instant>,
    limits: Limits,
}

impl Request {
    pub fn new(target: impl Into<String>, limits: Limits) -> Self {
        Self {
            target: target.into(),
            buffer: BytesMut::new(),
            requested: 0,
            state: RequestState::Pending,
            deadline: None,
            limits,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Starts the clock and sets the first read window. Returns the deadline.
    pub fn open(&mut self) -> Instant {
        let deadline = Instant::now() + self.limits.timeout;
        self.deadline = Some(deadline);
        self.requested = self.limits.initial_window;
        self.state = RequestState::Reading;
        deadline
    }

    /// Bytes still missing before the current window is filled.
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.buffer.len())
    }

    /// Byte range of the next read.
    pub fn next_range(&self) -> Range<usize> {
        self.buffer.len()..self.requested.max(self.buffer.len())
    }

    /// Appends as much of `chunk` as fits in the window. Returns the unused tail.
    pub fn append(&mut self, chunk: Bytes) -> Option<Bytes> {
        let take = chunk.len().min(self.missing());
        self.buffer.extend_from_slice(&chunk[..take]);
        (take < chunk.len()).then(|| chunk.slice(take..))
    }

    pub fn is_satisfied(&self) -> bool {
        self.buffer.len() >= self.requested
    }

    /// Sniffs the buffer and moves to the next state.
    ///
    /// `Ok(Some(meta))` is a match, `Ok(None)` means the window was widened
    /// and more bytes should be read.
    pub fn advance(&mut self, eof: bool) -> Result<Option<ImageMeta>, ProbeError> {
        self.state = RequestState::Parsing;

        match sniff(&self.buffer) {
            ParseOutcome::Matched(meta) => {
                self.state = RequestState::Done;
                Ok(Some(meta))
            }
            ParseOutcome::NotThisFormat => self.fail(ProbeError::Unrecognized),
            ParseOutcome::NeedMoreBytes(n) => {
                let len = self.buffer.len();
                if len >= self.limits.max_buffer {
                    return self.fail(ProbeError::GrowthCapExceeded {
                        limit: self.limits.max_buffer,
                    });
                }
                if eof {
                    return self.fail(ProbeError::Truncated { received: len });
                }
                self.requested = len.saturating_add(n).min(self.limits.max_buffer);
                self.state = RequestState::Reading;
                trace!(url = %self.target, have = len, want = self.requested, "growing read window");
                Ok(None)
            }
        }
    }

    pub fn fail<T>(&mut self, err: ProbeError) -> Result<T, ProbeError> {
        self.state = RequestState::Failed;
        Err(err)
    }
}

/// Source of further bytes for a [`Request`].
pub(crate) trait Feed: Send {
    /// Reads until the request's window is filled. Returns `true` at end of stream.
    fn fill<'a>(
        &'a mut self,
        request: &'a mut Request,
    ) -> impl Future<Output = Result<bool, TransportError>> + Send + 'a;
}

/// Pulls chunks from one open body, carrying any overshoot to the next fill.
pub(crate) struct StreamFeed<B> {
    body: B,
    carry: Option<Bytes>,
    eof: bool,
}

impl<B: BodyStream> StreamFeed<B> {
    pub(crate) fn new(body: B) -> Self {
        Self {
            body,
            carry: None,
            eof: false,
        }
    }
}

impl<B: BodyStream> Feed for StreamFeed<B> {
    async fn fill<'a>(&'a mut self, request: &'a mut Request) -> Result<bool, TransportError> {
        while !request.is_satisfied() {
            let chunk = match self.carry.take() {
                Some(chunk) => chunk,
                None if self.eof => break,
                None => match self.body.next_chunk().await? {
                    Some(chunk) => chunk,
                    None => {
                        self.eof = true;
                        break;
                    }
                },
            };
            self.carry = request.append(chunk);
        }
        Ok(self.eof && self.carry.is_none() && !request.is_satisfied())
    }
}

/// Issues one ranged read per growth step.
pub(crate) struct RangeFeed<'t, T> {
    transport: &'t T,
}

impl<'t, T: Transport> RangeFeed<'t, T> {
    pub(crate) fn new(transport: &'t T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Feed for RangeFeed<'_, T> {
    async fn fill<'a>(&'a mut self, request: &'a mut Request) -> Result<bool, TransportError> {
        if request.is_satisfied() {
            return Ok(false);
        }
        let range = request.next_range();
        let bytes = self.transport.read_range(request.target(), range).await?;
        request.append(bytes);
        Ok(!request.is_satisfied())
    }
}

/// Drives one request to a verdict under its deadline.
pub(crate) async fn run_one<T, F, Fut>(
    target: String,
    limits: Limits,
    connect: F,
) -> Outcome
where
    T: Feed,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut request = Request::new(target, limits);
    let deadline = request.open();
    debug!(url = %request.target(), window = request.requested(), "request opened");

    let timed = tokio::time::timeout_at(deadline, drive(&mut request, connect)).await;
    let result = match timed {
        Ok(result) => result,
        Err(_) => request.fail(ProbeError::Timeout(limits.timeout)),
    };

    match &result {
        Ok(meta) => debug!(
            url = %request.target(),
            format = %meta.format,
            width = meta.width,
            height = meta.height,
            bytes = request.buffer().len(),
            "request done"
        ),
        Err(err) => debug!(
            url = %request.target(),
            bytes = request.buffer().len(),
            error = %err,
            "request failed"
        ),
    }

    (request.target, result)
}

async fn drive<T, F, Fut>(request: &mut Request, connect: F) -> Result<ImageMeta, ProbeError>
where
    T: Feed,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut feed = match connect().await {
        Ok(feed) => feed,
        Err(err) => return request.fail(err.into()),
    };

    loop {
        let eof = match feed.fill(request).await {
            Ok(eof) => eof,
            Err(err) => return request.fail(err.into()),
        };
        if let Some(meta) = request.advance(eof)? {
            return Ok(meta);
        }
    }
}
