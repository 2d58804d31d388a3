// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cooperative cancellation shared between a background task and its owners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use event_listener::Event;

/// Clonable cancellation flag with an async wait.
///
/// All clones observe the same state. Cancelling is sticky and idempotent;
/// every task waiting in [`cancelled`](Self::cancelled) is woken.
///
/// # Example
///
/// ```
/// use groupflux_core::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let observer = token.clone();
///
/// let waiter = tokio::spawn(async move { observer.cancelled().await });
///
/// token.cancel();
/// waiter.await.unwrap();
/// assert!(token.is_cancelled());
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    event: Event,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every waiter.
    pub fn cancel(&self) {
        // Publish the flag before waking so woken waiters observe it.
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the token is cancelled. Returns immediately if it already is.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }

            let listener = self.inner.event.listen();

            // cancel() may have run between the check and listen().
            if self.is_cancelled() {
                return;
            }

            listener.await;
        }
    }
}
