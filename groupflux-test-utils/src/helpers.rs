// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::StreamExt;
use futures::Stream;
use groupflux_core::{FluxError, StreamItem};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Awaits the next item, failing on timeout, on stream end, or on an error item.
///
/// # Errors
///
/// Returns the stream's own error, or a `StreamProcessingError` when the
/// stream ended or did not emit within `timeout_ms`.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> Result<T, FluxError>
where
    S: Stream<Item = StreamItem<T>> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(StreamItem::Value(value))) => Ok(value),
        Ok(Some(StreamItem::Error(error))) => Err(error),
        Ok(None) => Err(FluxError::stream_error("Stream ended")),
        Err(_) => Err(FluxError::stream_error(format!(
            "No item within {timeout_ms}ms"
        ))),
    }
}

/// Unwraps a value item, panicking with context on anything else.
pub fn unwrap_value<T>(item: Option<StreamItem<T>>) -> T {
    match item {
        Some(StreamItem::Value(value)) => value,
        Some(StreamItem::Error(error)) => panic!("Expected a value, got error: {error}"),
        None => panic!("Expected a value, stream ended"),
    }
}

/// Panics unless the stream ends within `timeout_ms`.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(_)) => panic!("Expected stream to end, but it emitted an item"),
        Err(_) => panic!("Expected stream to end within {timeout_ms}ms"),
    }
}

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected element emitted, expected no output.");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}
