// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Single-slot rendezvous between one waiter and one resumer.

use event_listener::Event;
use std::sync::atomic::{AtomicBool, Ordering};

/// A reusable wake-up point holding at most one pending credit.
///
/// - [`resume`](Self::resume) wakes the task suspended in [`wait`](Self::wait),
///   or, if nobody is waiting, stores a credit that the next `wait` consumes
///   without suspending. Credits do not accumulate beyond one.
/// - Only one task may wait at a time.
///
/// Grouped streams use two of these per group: one signals "the consumer is
/// ready for another value", the other "a value (or termination) is ready".
///
/// # Example
///
/// ```
/// use groupflux_stream::Resumable;
///
/// # #[tokio::main]
/// # async fn main() {
/// let ready = Resumable::new();
///
/// ready.resume();
/// ready.resume(); // still a single credit
///
/// ready.wait().await; // consumes the credit immediately
/// assert!(!ready.is_pending());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Resumable {
    pending: AtomicBool,
    event: Event,
}

impl Resumable {
    /// Create a rendezvous with no pending credit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the waiter, or leave one credit for the next `wait`. Never blocks.
    pub fn resume(&self) {
        self.pending.store(true, Ordering::Release);
        self.event.notify(1);
    }

    /// Suspend until a credit is available, then consume it.
    pub async fn wait(&self) {
        loop {
            if self.take_credit() {
                return;
            }

            let listener = self.event.listen();

            // resume() may have landed between the check and listen().
            if self.take_credit() {
                return;
            }

            listener.await;
        }
    }

    /// Returns `true` if a credit is stored and the next `wait` will not suspend.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn take_credit(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
