// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Subscribers for streams of [`StreamItem`](groupflux_core::StreamItem).
//!
//! [`SubscribeExt::subscribe`] is the imperative end of a pipeline: it pulls
//! items one by one, hands values to an async handler, and reports errors,
//! completion and cancellation through callbacks.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
mod logging;
pub mod subscribe;

pub use subscribe::SubscribeExt;
