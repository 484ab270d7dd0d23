//! Passthrough capture of response bodies.
//!
//! [`CaptureStream`] forwards every chunk of a body stream unchanged while
//! copying it into a [`BoundedCapture`]. When the stream ends, or is dropped
//! before ending (client went away), the captured text is handed to a
//! completion callback exactly once.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_util::Stream;

use super::redact::truncate_text;

/// Chunks retained after a trim.
const MAX_RETAINED_CHUNKS: usize = 10;

/// Bounded, recency-favoring byte buffer.
///
/// Once more than `2 * max_length` bytes are held, the oldest chunks are
/// dropped for as long as at least `max_length` newer bytes remain, and at
/// most the last [`MAX_RETAINED_CHUNKS`] chunks are kept.
#[derive(Debug)]
pub struct BoundedCapture {
    chunks: VecDeque<Bytes>,
    total: usize,
    max_length: usize,
}

impl BoundedCapture {
    pub fn new(max_length: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            total: 0,
            max_length,
        }
    }

    pub fn push(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.total += chunk.len();
        self.chunks.push_back(chunk);

        if self.total > self.max_length.saturating_mul(2) {
            self.trim();
        }
    }

    fn trim(&mut self) {
        while let Some(front) = self.chunks.front() {
            if self.total - front.len() < self.max_length {
                break;
            }
            self.pop_front();
        }

        while self.chunks.len() > MAX_RETAINED_CHUNKS {
            self.pop_front();
        }
    }

    fn pop_front(&mut self) {
        if let Some(chunk) = self.chunks.pop_front() {
            self.total -= chunk.len();
        }
    }

    /// Bytes currently held.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Drain the buffer into lossy UTF-8 text truncated to `max_length`.
    ///
    /// Returns `None` if nothing was captured.
    pub fn finish(&mut self) -> Option<String> {
        if self.chunks.is_empty() {
            return None;
        }
        let mut bytes = Vec::with_capacity(self.total);
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk);
        }
        self.total = 0;

        Some(truncate_text(&String::from_utf8_lossy(&bytes), self.max_length))
    }
}

type OnComplete = Box<dyn FnOnce(Option<String>) + Send>;

/// Tee over a body data stream.
pub struct CaptureStream<S> {
    inner: S,
    capture: BoundedCapture,
    on_complete: Option<OnComplete>,
}

impl<S> CaptureStream<S> {
    pub fn new<F>(inner: S, capture: BoundedCapture, on_complete: F) -> Self
    where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        Self {
            inner,
            capture,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.capture.finish());
        }
    }
}

impl<S, E> Stream for CaptureStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.capture.push(chunk.clone());
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                this.complete();
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Drop for CaptureStream<S> {
    fn drop(&mut self) {
        self.complete();
    }
}
