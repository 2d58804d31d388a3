// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::partition::{Partition, Take};
use super::GroupKey;
use core::fmt::Debug;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::stream::{self, Stream};
use groupflux_core::{FluxError, FluxTask, Result, StreamItem};
use std::sync::Arc;

/// One group emitted by [`group_by`](super::GroupByExt::group_by).
///
/// A `GroupedStream` is a handle: it carries the group's key and gives
/// access to the group's values through [`subscribe`](Self::subscribe),
/// which may succeed only once. Values are handed over one at a time; the
/// dispatcher does not read the next source item until this group's
/// consumer has taken the previous value routed here.
///
/// Dropping a handle that was never subscribed cancels the group: later
/// values for its key are discarded.
pub struct GroupedStream<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    partition: Arc<Partition<K, V>>,
    guard: Option<Arc<FluxTask>>,
}

impl<K, V> GroupedStream<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    pub(crate) fn new(partition: Arc<Partition<K, V>>) -> Self {
        Self {
            partition,
            guard: None,
        }
    }

    /// Keep the dispatcher task alive for as long as this group is reachable.
    pub(crate) fn with_guard(mut self, guard: Arc<FluxTask>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// The key shared by every value of this group.
    pub fn key(&self) -> &K {
        self.partition.key()
    }

    /// Returns `true` once the group has a consumer.
    pub fn is_subscribed(&self) -> bool {
        self.partition.is_subscribed()
    }

    /// Start consuming the group's values.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::AlreadySubscribed`] if the group was subscribed
    /// before, whether or not that subscription has finished.
    ///
    /// # Example
    ///
    /// ```
    /// use groupflux_stream::GroupByExt;
    /// use groupflux_core::StreamItem;
    /// use futures::{stream, StreamExt};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> groupflux_core::Result<()> {
    /// let source = stream::iter(vec![StreamItem::Value(("a", 1))]);
    /// let mut groups = source.group_by(|(key, _)| *key);
    ///
    /// let group = groups.next().await.unwrap().unwrap();
    /// let mut values = group.subscribe()?;
    /// assert!(group.subscribe().is_err());
    ///
    /// assert_eq!(values.next().await.unwrap().unwrap(), ("a", 1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> Result<GroupSubscription<K, V>> {
        if !self.partition.claim() {
            return Err(FluxError::already_subscribed(self.key()));
        }

        // A producer may already be parked on the first value.
        self.partition.consumer_ready();

        Ok(GroupSubscription::new(self.partition.clone(), self.guard.clone()))
    }
}

impl<K, V> Drop for GroupedStream<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn drop(&mut self) {
        if !self.partition.is_subscribed() {
            self.partition.cancel();
        }
    }
}

impl<K, V> Debug for GroupedStream<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupedStream")
            .field("key", self.key())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

type ValueStream<V> = Pin<Box<dyn Stream<Item = StreamItem<V>> + Send + 'static>>;

/// The values of one group, in the order the source produced them.
///
/// Ends after the source completes, or after yielding the source's error.
/// Dropping the subscription before its end cancels the group.
pub struct GroupSubscription<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    inner: ValueStream<V>,
    partition: Arc<Partition<K, V>>,
    finished: bool,
    _guard: Option<Arc<FluxTask>>,
}

impl<K, V> GroupSubscription<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn new(partition: Arc<Partition<K, V>>, guard: Option<Arc<FluxTask>>) -> Self {
        let values = stream::unfold(
            (partition.clone(), false),
            |(partition, delivered)| async move {
                // The previous value reached the consumer: let the producer push the next one.
                if delivered {
                    partition.consumer_ready();
                }

                loop {
                    match partition.take() {
                        Take::Value(value) => {
                            return Some((StreamItem::Value(value), (partition, true)));
                        }
                        Take::Error(error) => {
                            return Some((StreamItem::Error(error), (partition, false)));
                        }
                        Take::End => return None,
                        Take::Empty => partition.value_ready().await,
                    }
                }
            },
        );

        Self {
            inner: Box::pin(values),
            partition,
            finished: false,
            _guard: guard,
        }
    }

    /// The key of the subscribed group.
    pub fn key(&self) -> &K {
        self.partition.key()
    }
}

impl<K, V> Stream for GroupSubscription<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    type Item = StreamItem<V>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let polled = self.inner.as_mut().poll_next(cx);
        match &polled {
            Poll::Ready(None) | Poll::Ready(Some(StreamItem::Error(_))) => {
                self.finished = true;
                self.partition.finish();
            }
            _ => {}
        }
        polled
    }
}

impl<K, V> Drop for GroupSubscription<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn drop(&mut self) {
        if !self.finished {
            self.partition.cancel();
        }
    }
}

impl<K, V> Debug for GroupSubscription<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupSubscription")
            .field("key", self.key())
            .field("finished", &self.finished)
            .finish()
    }
}
