// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Group-by operator that splits one stream into one sub-stream per key.
//!
//! [`group_by`](GroupByExt::group_by) reads a source stream, computes a key for
//! every item and routes it into the [`GroupedStream`] of that key. The first
//! time a key is seen, its group is emitted on the returned
//! [`GroupedStreams`]; every later item with that key is delivered into the
//! existing group.
//!
//! ## Characteristics
//!
//! - **Spawns task**: routing runs in a background task that lives as long as
//!   the outer stream or any emitted group is alive
//! - **Back-pressured**: each group buffers at most one value; the source is
//!   not read again until the value was taken. A slow group therefore stalls
//!   every other group, including groups not created yet
//! - **Ordered**: a group is emitted before any of its values is delivered;
//!   within a group values keep source order
//! - **Single consumer**: each group can be subscribed once
//! - **Error propagation**: a source error is delivered to every live group
//!   after its buffered value, and to the outer stream
//!
//! ## Cancellation
//!
//! - Dropping a group's subscription (or an unsubscribed group) removes the
//!   group. Later values for its key create a new group if the outer stream is
//!   still alive.
//! - Dropping the outer stream stops the creation of new groups. Values with
//!   unknown keys are discarded while already emitted groups keep receiving
//!   theirs. Once no group is left, the source is dropped.
//!
//! Groups must be consumed concurrently with the outer stream: awaiting one
//! group's end before polling the outer stream again deadlocks as soon as
//! another key shows up. [`GroupedStreamsExt::to_map`] does this for you.
//!
//! ## Example
//!
//! ```rust
//! use groupflux_stream::{GroupByExt, GroupedStreamsExt};
//! use groupflux_core::StreamItem;
//! use futures::stream;
//!
//! # #[tokio::main]
//! # async fn main() -> groupflux_core::Result<()> {
//! let source = stream::iter(
//!     vec![("x", 1), ("y", 2), ("x", 3)]
//!         .into_iter()
//!         .map(StreamItem::Value),
//! );
//!
//! let groups = source
//!     .group_by_with(|(key, _)| *key, |(_, value)| value)
//!     .to_map()
//!     .await?;
//!
//! assert_eq!(groups["x"], vec![1, 3]);
//! assert_eq!(groups["y"], vec![2]);
//! # Ok(())
//! # }
//! ```

mod collect;
mod dispatcher;
mod grouped_stream;
mod partition;
mod partition_table;

pub use collect::{GroupItem, GroupedStreamsExt};
pub use grouped_stream::{GroupSubscription, GroupedStream};

use core::fmt::Debug;
use core::hash::Hash;
use core::pin::{pin, Pin};
use core::task::{Context, Poll};
use crate::logging::debug;
use dispatcher::dispatch;
use futures::channel::mpsc::{self, Receiver};
use futures::future::{select, Either};
use futures::{Stream, StreamExt};
use groupflux_core::{FluxTask, StreamItem};
use partition_table::PartitionTable;
use std::sync::Arc;

/// Requirements on group keys.
pub trait GroupKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<K> GroupKey for K where K: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Extension trait providing the `group_by` operators.
pub trait GroupByExt<T>: Stream<Item = StreamItem<T>> + Sized
where
    T: Send + 'static,
{
    /// Groups items by `key_selector`; each group yields the original items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use groupflux_stream::GroupByExt;
    /// use groupflux_core::StreamItem;
    /// use futures::{stream, StreamExt};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> groupflux_core::Result<()> {
    /// let source = stream::iter((1..=4).map(StreamItem::Value));
    /// let mut groups = source.group_by(|n: &i32| n % 2 == 0);
    ///
    /// let odd = groups.next().await.unwrap().unwrap();
    /// assert!(!*odd.key());
    /// let mut odd_values = odd.subscribe()?;
    /// assert_eq!(odd_values.next().await.unwrap().unwrap(), 1);
    /// # Ok(())
    /// # }
    /// ```
    fn group_by<K, KF>(self, key_selector: KF) -> GroupedStreams<K, T>
    where
        Self: Send + 'static,
        K: GroupKey,
        KF: Fn(&T) -> K + Send + 'static;

    /// Groups items by `key_selector` and maps each item with `value_selector`
    /// before it enters its group.
    ///
    /// # Errors
    ///
    /// Source errors are yielded once on the returned stream and once on every
    /// live group, after that group's buffered value.
    fn group_by_with<K, V, KF, VF>(
        self,
        key_selector: KF,
        value_selector: VF,
    ) -> GroupedStreams<K, V>
    where
        Self: Send + 'static,
        K: GroupKey,
        V: Send + 'static,
        KF: Fn(&T) -> K + Send + 'static,
        VF: Fn(T) -> V + Send + 'static;
}

impl<S, T> GroupByExt<T> for S
where
    S: Stream<Item = StreamItem<T>>,
    T: Send + 'static,
{
    fn group_by<K, KF>(self, key_selector: KF) -> GroupedStreams<K, T>
    where
        Self: Send + 'static,
        K: GroupKey,
        KF: Fn(&T) -> K + Send + 'static,
    {
        self.group_by_with(key_selector, |item| item)
    }

    fn group_by_with<K, V, KF, VF>(
        self,
        key_selector: KF,
        value_selector: VF,
    ) -> GroupedStreams<K, V>
    where
        Self: Send + 'static,
        K: GroupKey,
        V: Send + 'static,
        KF: Fn(&T) -> K + Send + 'static,
        VF: Fn(T) -> V + Send + 'static,
    {
        // Capacity 0: at most one emitted group waits for the outer consumer.
        let (sender, receiver) = mpsc::channel(0);

        let task = FluxTask::spawn(move |cancel| async move {
            let table = PartitionTable::new(cancel.clone());
            let routing = dispatch(self, key_selector, value_selector, table, sender);

            let cancelled = cancel.cancelled();

            if let Either::Right(_) = select(pin!(routing), pin!(cancelled)).await {
                debug!("group_by: dispatcher cancelled");
            }
        });

        GroupedStreams {
            receiver,
            guard: Arc::new(task),
        }
    }
}

/// Stream of the groups discovered by [`group_by`](GroupByExt::group_by),
/// in first-seen key order.
///
/// Dropping it stops the creation of new groups without affecting groups
/// already handed out.
pub struct GroupedStreams<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    receiver: Receiver<StreamItem<GroupedStream<K, V>>>,
    guard: Arc<FluxTask>,
}

impl<K, V> Stream for GroupedStreams<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    type Item = StreamItem<GroupedStream<K, V>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let guard = self.guard.clone();
        self.receiver
            .poll_next_unpin(cx)
            .map(|item| item.map(|item| item.map(|group| group.with_guard(guard))))
    }
}

impl<K, V> Debug for GroupedStreams<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupedStreams")
            .field("receiver", &"<channel>")
            .finish()
    }
}
