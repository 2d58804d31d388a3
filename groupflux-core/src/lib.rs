// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by the groupflux crates.
//!
//! - [`StreamItem`]: value-or-error items carried by every stream
//! - [`FluxError`] / [`Result`]: the error taxonomy
//! - [`CancellationToken`] and [`FluxTask`]: background tasks with cooperative cancellation
//! - [`Mutex`]: the lock used for state that is never held across an `.await`

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod cancellation_token;
pub mod error;
pub mod flux_task;
pub mod stream_item;

pub use self::cancellation_token::CancellationToken;
pub use self::error::{FluxError, IntoFluxError, Result, ResultExt};
pub use self::flux_task::FluxTask;
pub use self::stream_item::StreamItem;

pub use parking_lot::Mutex;
