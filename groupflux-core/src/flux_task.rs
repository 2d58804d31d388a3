// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background tasks with cooperative cancellation.

use crate::CancellationToken;
use std::future::Future;

/// Handle to a spawned background task that is cancelled when dropped.
///
/// The spawned future receives a [`CancellationToken`] and is expected to
/// stop at its next await point once the token fires. Operators that route
/// one source into several outputs (such as `group_by`) keep the handle
/// behind an `Arc` shared by all outputs, so the task lives exactly as long
/// as somebody can still observe its results.
///
/// # Example
///
/// ```rust
/// use groupflux_core::FluxTask;
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = FluxTask::spawn(|cancel| async move {
///     cancel.cancelled().await;
/// });
///
/// assert!(!task.is_cancelled());
/// drop(task); // signals the token
/// # }
/// ```
#[derive(Debug)]
pub struct FluxTask {
    cancel: CancellationToken,
}

impl FluxTask {
    /// Spawn `f(token)` on the configured runtime.
    #[cfg(feature = "runtime-tokio")]
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        tokio::spawn(f(cancel.clone()));
        Self { cancel }
    }

    /// Signal the task to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once `cancel()` was called or the handle was dropped.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token shared with the running task.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for FluxTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
