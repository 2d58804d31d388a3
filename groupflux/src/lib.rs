// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Group-by for asynchronous streams.
//!
//! `groupflux` splits one stream into one sub-stream per key. Groups are
//! emitted as their keys are discovered, each group has exactly one
//! consumer, and the source only advances as fast as the groups drain.
//!
//! ```rust
//! use groupflux::prelude::*;
//! use futures::stream;
//!
//! # #[tokio::main]
//! # async fn main() -> groupflux::Result<()> {
//! let rows = stream::iter(
//!     vec![("eu", 3), ("us", 5), ("eu", 4)]
//!         .into_iter()
//!         .map(StreamItem::Value),
//! );
//!
//! let by_region = rows
//!     .group_by_with(|(region, _)| *region, |(_, amount)| amount)
//!     .to_map()
//!     .await?;
//!
//! assert_eq!(by_region["eu"], vec![3, 4]);
//! assert_eq!(by_region["us"], vec![5]);
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! - `groupflux-core`: [`StreamItem`], [`FluxError`], [`CancellationToken`]
//! - `groupflux-stream`: `group_by`, [`Resumable`], `buffer_until_changed`
//! - `groupflux-exec`: [`SubscribeExt::subscribe`]

pub use groupflux_core::{CancellationToken, FluxError, Result, StreamItem};
pub use groupflux_exec::SubscribeExt;
pub use groupflux_stream::{BufferUntilChangedExt, Resumable};

#[cfg(feature = "runtime-tokio")]
pub use groupflux_stream::{
    GroupByExt, GroupItem, GroupKey, GroupSubscription, GroupedStream, GroupedStreams,
    GroupedStreamsExt,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use groupflux_core::{FluxError, StreamItem};
    pub use groupflux_exec::SubscribeExt;
    pub use groupflux_stream::prelude::*;
}
