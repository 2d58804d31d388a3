// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Partitioning operators for streams of [`StreamItem`](groupflux_core::StreamItem).
//!
//! The centerpiece is [`group_by`](GroupByExt::group_by): one source stream is
//! split into one [`GroupedStream`] per key, emitted lazily as keys are
//! discovered. Every group is a depth-one hand-off, so the source advances
//! only as fast as the groups are consumed.
//!
//! # Operators
//!
//! | Operator | Output | Use When |
//! |----------|--------|----------|
//! | [`group_by`](GroupByExt::group_by) | stream of groups, one per key | keys are interleaved, each group is consumed concurrently |
//! | [`group_by_with`](GroupByExt::group_by_with) | same, with mapped values | only part of each item belongs in the group |
//! | [`to_map`](GroupedStreamsExt::to_map) | `HashMap<K, Vec<V>>` | the whole input fits in memory |
//! | [`buffer_until_changed`](BufferUntilChangedExt::buffer_until_changed) | `Vec<T>` per run of equal keys | the source is already sorted by key |
//!
//! # Building Blocks
//!
//! [`Resumable`] is the single-credit rendezvous the groups are built on. It
//! is public because it is useful on its own for hand-offs between exactly
//! two tasks.
//!
//! # Runtime
//!
//! `group_by` spawns its routing task through
//! [`FluxTask`](groupflux_core::FluxTask), which requires the `runtime-tokio`
//! feature (on by default).

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

mod logging;

pub mod buffer_until_changed;
#[cfg(feature = "runtime-tokio")]
pub mod group_by;
pub mod resumable;

pub use buffer_until_changed::BufferUntilChangedExt;
#[cfg(feature = "runtime-tokio")]
pub use group_by::{
    GroupByExt, GroupItem, GroupKey, GroupSubscription, GroupedStream, GroupedStreams,
    GroupedStreamsExt,
};
pub use resumable::Resumable;

/// Everything needed to call the operators of this crate.
pub mod prelude {
    pub use crate::buffer_until_changed::BufferUntilChangedExt;
    #[cfg(feature = "runtime-tokio")]
    pub use crate::group_by::{GroupByExt, GroupedStreamsExt};
    pub use groupflux_core::StreamItem;
}
