// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared state of one group: a depth-one hand-off between the dispatcher and
//! the group's single consumer.

use super::partition_table::PartitionTable;
use super::GroupKey;
use crate::logging::debug;
use crate::Resumable;
use groupflux_core::{FluxError, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

struct Slot<V> {
    value: Option<V>,
    done: bool,
    error: Option<FluxError>,
}

/// What the consumer finds when it inspects the slot.
pub(crate) enum Take<V> {
    Value(V),
    Error(FluxError),
    End,
    Empty,
}

pub(crate) struct Partition<K, V> {
    key: K,
    slot: Mutex<Slot<V>>,
    cancelled: AtomicBool,
    subscribed: AtomicBool,
    consumer_ready: Resumable,
    value_ready: Resumable,
    table: Weak<PartitionTable<K, V>>,
}

impl<K, V> Partition<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    pub(crate) fn new(key: K, table: Weak<PartitionTable<K, V>>) -> Self {
        Self {
            key,
            slot: Mutex::new(Slot {
                value: None,
                done: false,
                error: None,
            }),
            cancelled: AtomicBool::new(false),
            subscribed: AtomicBool::new(false),
            consumer_ready: Resumable::new(),
            value_ready: Resumable::new(),
            table,
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Hand `value` to the consumer, waiting until the previous one was taken.
    ///
    /// Must not be called concurrently for the same partition. A cancelled
    /// partition drops the value.
    pub(crate) async fn next(&self, value: V) {
        if self.is_cancelled() {
            return;
        }

        self.consumer_ready.wait().await;

        // The consumer may have left while we were parked.
        if self.is_cancelled() {
            return;
        }

        self.slot.lock().value = Some(value);
        self.value_ready.resume();
    }

    pub(crate) fn error(&self, error: FluxError) {
        {
            let mut slot = self.slot.lock();
            slot.error = Some(error);
            slot.done = true;
        }
        self.value_ready.resume();
    }

    pub(crate) fn complete(&self) {
        self.slot.lock().done = true;
        self.value_ready.resume();
    }

    /// Buffered data always comes before the terminal signal.
    pub(crate) fn take(&self) -> Take<V> {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.value.take() {
            return Take::Value(value);
        }
        if slot.done {
            return slot.error.take().map_or(Take::End, Take::Error);
        }
        Take::Empty
    }

    pub(crate) async fn value_ready(&self) {
        self.value_ready.wait().await;
    }

    pub(crate) fn consumer_ready(&self) {
        self.consumer_ready.resume();
    }

    /// Claim the single consumer slot. Returns `false` if it was already taken.
    pub(crate) fn claim(&self) -> bool {
        self.subscribed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The consumer walked away: stop accepting values and release a parked producer.
    pub(crate) fn cancel(&self) {
        debug!("group_by: consumer of key {:?} cancelled", self.key);
        self.cancelled.store(true, Ordering::Release);
        self.detach();
        self.consumer_ready.resume();
    }

    /// The consumer reached the end of the group.
    pub(crate) fn finish(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.detach();
    }

    fn detach(&self) {
        if let Some(table) = self.table.upgrade() {
            table.remove(&self.key, self);
        }
    }
}
