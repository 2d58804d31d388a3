// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::partition::Partition;
use super::GroupKey;
use crate::logging::debug;
use groupflux_core::{CancellationToken, FluxError, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Key to partition map owned by one `group_by` dispatch.
///
/// The table owns the partitions; partitions only hold a `Weak` reference
/// back, used to remove themselves when their consumer leaves.
pub(crate) struct PartitionTable<K, V> {
    partitions: Mutex<HashMap<K, Arc<Partition<K, V>>>>,
    main_stopped: AtomicBool,
    shutdown: CancellationToken,
}

impl<K, V> PartitionTable<K, V>
where
    K: GroupKey,
    V: Send + 'static,
{
    /// `shutdown` is cancelled when the last partition leaves after the
    /// main stream stopped.
    pub(crate) fn new(shutdown: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            partitions: Mutex::new(HashMap::new()),
            main_stopped: AtomicBool::new(false),
            shutdown,
        })
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<Partition<K, V>>> {
        self.partitions.lock().get(key).cloned()
    }

    pub(crate) fn create(self: &Arc<Self>, key: K) -> Arc<Partition<K, V>> {
        let partition = Arc::new(Partition::new(key.clone(), Arc::downgrade(self)));
        self.partitions.lock().insert(key, partition.clone());
        partition
    }

    /// Remove `key` if it still maps to `partition`.
    pub(crate) fn remove(&self, key: &K, partition: &Partition<K, V>) {
        let now_empty = {
            let mut partitions = self.partitions.lock();
            match partitions.get(key) {
                Some(current) if core::ptr::eq(Arc::as_ptr(current), partition) => {
                    partitions.remove(key);
                    partitions.is_empty()
                }
                _ => return,
            }
        };

        if now_empty && self.is_stopped() {
            debug!("group_by: last group left after the main stream stopped");
            self.shutdown.cancel();
        }
    }

    /// The main stream is gone: no partition will be created from now on.
    pub(crate) fn stop(&self) {
        self.main_stopped.store(true, Ordering::Release);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.main_stopped.load(Ordering::Acquire)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.partitions.lock().is_empty()
    }

    pub(crate) fn complete_all(&self) {
        for partition in self.drain() {
            partition.complete();
        }
    }

    pub(crate) fn error_all(&self, error: &FluxError) {
        for partition in self.drain() {
            partition.error(error.clone());
        }
    }

    fn drain(&self) -> Vec<Arc<Partition<K, V>>> {
        self.partitions.lock().drain().map(|(_, p)| p).collect()
    }
}
