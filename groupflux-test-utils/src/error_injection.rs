// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stream wrapper that injects a `StreamItem::Error` at a fixed position.

use futures::Stream;
use groupflux_core::{FluxError, StreamItem};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Wraps plain items in `StreamItem::Value` and emits one injected error at
/// position `inject_error_at` (0-indexed), after which the inner stream
/// continues.
///
/// # Examples
///
/// ```rust
/// use groupflux_test_utils::ErrorInjectingStream;
/// use groupflux_core::StreamItem;
/// use futures::{stream, StreamExt};
///
/// # async fn example() {
/// let mut items = ErrorInjectingStream::new(stream::iter(vec![1, 2]), 1);
///
/// assert!(matches!(items.next().await, Some(StreamItem::Value(1))));
/// assert!(matches!(items.next().await, Some(StreamItem::Error(_))));
/// assert!(matches!(items.next().await, Some(StreamItem::Value(2))));
/// # }
/// ```
pub struct ErrorInjectingStream<S> {
    inner: S,
    inject_error_at: Option<usize>,
    count: usize,
}

impl<S> ErrorInjectingStream<S> {
    pub fn new(inner: S, inject_error_at: usize) -> Self {
        Self {
            inner,
            inject_error_at: Some(inject_error_at),
            count: 0,
        }
    }
}

impl<S> Stream for ErrorInjectingStream<S>
where
    S: Stream + Unpin,
{
    type Item = StreamItem<S::Item>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.inject_error_at == Some(self.count) {
            self.inject_error_at = None;
            self.count += 1;
            return Poll::Ready(Some(StreamItem::Error(FluxError::stream_error(
                "Injected test error",
            ))));
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(item)) => {
                self.count += 1;
                Poll::Ready(Some(StreamItem::Value(item)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
