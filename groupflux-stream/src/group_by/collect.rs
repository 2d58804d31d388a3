// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Folds that drain groups into plain collections.

use super::grouped_stream::GroupedStream;
use super::GroupKey;
use core::future::Future;
use core::pin::pin;
use futures::{Stream, StreamExt};
use groupflux_core::{Result, StreamItem};
use std::collections::HashMap;

/// A drained group: its key and every value it received.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupItem<K, V> {
    /// The group key
    pub key: K,
    /// Values in source order
    pub values: Vec<V>,
}

impl<K, V> GroupedStream<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    /// Subscribe and collect every value of the group.
    ///
    /// # Errors
    ///
    /// Fails if the group was already subscribed, or with the source error
    /// that terminated the group.
    pub async fn to_values(self) -> Result<Vec<V>> {
        let mut subscription = self.subscribe()?;
        let mut values = Vec::new();

        while let Some(item) = subscription.next().await {
            match item {
                StreamItem::Value(value) => values.push(value),
                StreamItem::Error(error) => return Err(error),
            }
        }

        Ok(values)
    }

    /// Like [`to_values`](Self::to_values), paired with the group key.
    ///
    /// # Errors
    ///
    /// Same as [`to_values`](Self::to_values).
    pub async fn to_group_item(self) -> Result<GroupItem<K, V>> {
        let key = self.key().clone();
        let values = self.to_values().await?;
        Ok(GroupItem { key, values })
    }
}

/// Folds over the output of [`group_by`](super::GroupByExt::group_by).
pub trait GroupedStreamsExt<K, V>: Stream<Item = StreamItem<GroupedStream<K, V>>> + Sized
where
    K: GroupKey,
    V: Send + 'static,
{
    /// Drain every group into a map from key to values.
    ///
    /// Groups are drained concurrently as they are discovered, which the
    /// back-pressured dispatcher requires to make progress.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the outer stream or by any group.
    fn to_map(self) -> impl Future<Output = Result<HashMap<K, Vec<V>>>> + Send
    where
        Self: Send,
    {
        self.to_map_into(HashMap::new())
    }

    /// Same as [`to_map`](Self::to_map), inserting into `destination`.
    /// Existing entries for a drained key are replaced.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the outer stream or by any group.
    fn to_map_into(
        self,
        destination: HashMap<K, Vec<V>>,
    ) -> impl Future<Output = Result<HashMap<K, Vec<V>>>> + Send
    where
        Self: Send;
}

impl<S, K, V> GroupedStreamsExt<K, V> for S
where
    S: Stream<Item = StreamItem<GroupedStream<K, V>>>,
    K: GroupKey,
    V: Send + 'static,
{
    fn to_map_into(
        self,
        mut destination: HashMap<K, Vec<V>>,
    ) -> impl Future<Output = Result<HashMap<K, Vec<V>>>> + Send
    where
        Self: Send,
    {
        async move {
            let mut drained = pin!(self
                .map(|item| async move {
                    match item {
                        StreamItem::Value(group) => group.to_group_item().await,
                        StreamItem::Error(error) => Err(error),
                    }
                })
                .buffer_unordered(usize::MAX));

            while let Some(drained_group) = drained.next().await {
                let GroupItem { key, values } = drained_group?;
                destination.insert(key, values);
            }

            Ok(destination)
        }
    }
}
