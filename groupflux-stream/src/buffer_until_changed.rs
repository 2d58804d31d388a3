// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Buffer-until-changed operator that batches runs of items sharing a key.
//!
//! [`buffer_until_changed`](BufferUntilChangedExt::buffer_until_changed) groups
//! *consecutive* items whose selected key is equal. A window is emitted as soon
//! as an item with a different key arrives; the last window is flushed when the
//! source completes.
//!
//! Unlike [`group_by`](crate::GroupByExt::group_by) it needs no concurrent
//! consumers, but it only groups correctly when the source is already ordered
//! by key, e.g. rows of a one-to-many join.
//!
//! # Error Handling
//!
//! An error discards the pending window and is forwarded immediately.

use core::mem::take;
use futures::future::ready;
use futures::{stream, Stream, StreamExt};
use groupflux_core::{Mutex, StreamItem};
use std::sync::Arc;

/// Extension trait providing the
/// [`buffer_until_changed`](Self::buffer_until_changed) operator.
pub trait BufferUntilChangedExt<T>: Stream<Item = StreamItem<T>> + Sized
where
    T: Send + 'static,
{
    /// Collects runs of consecutive items with an equal `selector` key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use groupflux_stream::BufferUntilChangedExt;
    /// use groupflux_core::StreamItem;
    /// use futures::{stream, StreamExt};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let rows = stream::iter(
    ///     vec![(1, "a"), (1, "b"), (2, "c"), (1, "d")]
    ///         .into_iter()
    ///         .map(StreamItem::Value),
    /// );
    ///
    /// let windows: Vec<_> = rows
    ///     .buffer_until_changed(|(id, _)| *id)
    ///     .map(StreamItem::unwrap)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(
    ///     windows,
    ///     vec![vec![(1, "a"), (1, "b")], vec![(2, "c")], vec![(1, "d")]]
    /// );
    /// # }
    /// ```
    fn buffer_until_changed<K, F>(
        self,
        selector: F,
    ) -> impl Stream<Item = StreamItem<Vec<T>>> + Send + Unpin
    where
        Self: Send + 'static,
        K: PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static;
}

impl<S, T> BufferUntilChangedExt<T> for S
where
    S: Stream<Item = StreamItem<T>>,
    T: Send + 'static,
{
    fn buffer_until_changed<K, F>(
        self,
        selector: F,
    ) -> impl Stream<Item = StreamItem<Vec<T>>> + Send + Unpin
    where
        Self: Send + 'static,
        K: PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        // State: (pending window, key of the pending window)
        let state = Arc::new(Mutex::new((Vec::new(), None::<K>)));
        let run_state = Arc::clone(&state);

        let runs = self.filter_map(move |item| {
            let mut guard = run_state.lock();
            let (window, current_key) = &mut *guard;

            ready(match item {
                StreamItem::Value(value) => {
                    let key = selector(&value);
                    let changed = current_key.as_ref().is_some_and(|current| *current != key);
                    let emitted = if changed { Some(take(window)) } else { None };

                    *current_key = Some(key);
                    window.push(value);
                    emitted.map(StreamItem::Value)
                }
                StreamItem::Error(error) => {
                    window.clear();
                    *current_key = None;
                    Some(StreamItem::Error(error))
                }
            })
        });

        let flush = stream::once(async move {
            let mut guard = state.lock();
            let (window, current_key) = &mut *guard;
            *current_key = None;

            if window.is_empty() {
                None
            } else {
                Some(StreamItem::Value(take(window)))
            }
        })
        .filter_map(ready);

        Box::pin(runs.chain(flush))
    }
}
