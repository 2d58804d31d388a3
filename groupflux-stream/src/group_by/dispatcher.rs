// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::grouped_stream::GroupedStream;
use super::partition_table::PartitionTable;
use super::GroupKey;
use crate::logging::{debug, warn};
use futures::channel::mpsc::Sender;
use futures::{SinkExt, Stream, StreamExt};
use groupflux_core::StreamItem;
use std::sync::Arc;

pub(crate) type GroupSender<K, V> = Sender<StreamItem<GroupedStream<K, V>>>;

/// Route every source item into the partition of its key.
///
/// Runs until the source ends or fails, or until the main stream was dropped
/// and no partition is left to feed.
pub(crate) async fn dispatch<S, T, K, V, KF, VF>(
    source: S,
    key_selector: KF,
    value_selector: VF,
    table: Arc<PartitionTable<K, V>>,
    mut downstream: GroupSender<K, V>,
) where
    S: Stream<Item = StreamItem<T>>,
    K: GroupKey,
    V: Send + 'static,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
{
    let mut source = core::pin::pin!(source);

    while let Some(item) = source.next().await {
        let element = match item {
            StreamItem::Value(element) => element,
            StreamItem::Error(error) => {
                warn!("group_by: source failed, terminating all groups: {}", error);
                table.error_all(&error);
                let _ = downstream.send(StreamItem::Error(error)).await;
                return;
            }
        };

        let key = key_selector(&element);
        let value = value_selector(element);

        if let Some(partition) = table.get(&key) {
            // Back-pressure: the source is not read again until this key's consumer took the value.
            partition.next(value).await;
            continue;
        }

        if table.is_stopped() {
            if table.is_empty() {
                debug!("group_by: main stream stopped and no group left");
                return;
            }
            debug!("group_by: dropping value for new key {:?} after main stream stopped", key);
            continue;
        }

        debug!("group_by: new key {:?}", key);
        let partition = table.create(key);

        let group = GroupedStream::new(partition.clone());
        // A rejected group is dropped with the send future, which cancels its partition.
        let emitted = downstream.send(StreamItem::Value(group)).await.is_ok();
        if !emitted {
            debug!("group_by: main stream dropped, no new groups will be created");
            table.stop();
            if table.is_empty() {
                return;
            }
            continue;
        }

        partition.next(value).await;
    }

    debug!("group_by: source completed");
    table.complete_all();
}
