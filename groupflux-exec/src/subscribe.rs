// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::{debug, warn};
use async_trait::async_trait;
use core::error::Error;
use core::future::Future;
use core::pin::pin;
use futures::future::{select, Either};
use futures::stream::{Stream, StreamExt};
use groupflux_core::{CancellationToken, FluxError, Result, StreamItem};

/// Extension trait that drives a stream of [`StreamItem`]s to completion.
#[async_trait]
pub trait SubscribeExt<T>: Stream<Item = StreamItem<T>> + Sized {
    /// Consumes the stream, running `on_next_func` for every value.
    ///
    /// Values are handled one at a time: the next item is not polled until
    /// the handler for the previous one has finished, so a grouped stream
    /// consumed this way keeps its back-pressure.
    ///
    /// # Behavior
    ///
    /// - **Values**: passed to `on_next_func` together with the cancellation token
    /// - **Handler errors**: wrapped as [`FluxError::UserError`] and passed to
    ///   `on_error_callback`; processing continues with the next item
    /// - **Stream errors**: passed to `on_error_callback`; the stream is terminal
    ///   after an error, so the subscription ends without calling `on_complete_callback`
    /// - **Completion**: `on_complete_callback` runs once when the stream ends
    /// - **Cancellation**: once `cancellation_token` is cancelled the stream is
    ///   dropped; neither callback runs
    ///
    /// # Errors
    ///
    /// Without an error callback, every error is collected and returned as
    /// [`FluxError::MultipleErrors`] when the subscription ends.
    ///
    /// # Examples
    ///
    /// ```
    /// use groupflux_core::{FluxError, StreamItem};
    /// use groupflux_exec::SubscribeExt;
    /// use futures::stream;
    /// use std::sync::{Arc, Mutex};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    ///
    /// stream::iter(vec![1, 2, 3].into_iter().map(StreamItem::Value))
    ///     .subscribe(
    ///         move |value, _token| {
    ///             let sink = sink.clone();
    ///             async move {
    ///                 sink.lock().unwrap().push(value);
    ///                 Ok::<(), std::io::Error>(())
    ///             }
    ///         },
    ///         None::<fn(FluxError)>,
    ///         Some(|| println!("done")),
    ///         None,
    ///     )
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    /// # }
    /// ```
    async fn subscribe<F, Fut, E, OnError, OnComplete>(
        self,
        on_next_func: F,
        on_error_callback: Option<OnError>,
        on_complete_callback: Option<OnComplete>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()>
    where
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<(), E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
        OnError: Fn(FluxError) + Send + Sync + 'static,
        OnComplete: FnOnce() + Send + 'static;
}

#[async_trait]
impl<S, T> SubscribeExt<T> for S
where
    S: Stream<Item = StreamItem<T>> + Send + Unpin + 'static,
    T: Send + 'static,
{
    async fn subscribe<F, Fut, E, OnError, OnComplete>(
        mut self,
        on_next_func: F,
        on_error_callback: Option<OnError>,
        on_complete_callback: Option<OnComplete>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()>
    where
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<(), E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
        OnError: Fn(FluxError) + Send + Sync + 'static,
        OnComplete: FnOnce() + Send + 'static,
    {
        let cancellation_token = cancellation_token.unwrap_or_default();
        let mut collected_errors = Vec::new();

        let mut report = |error: FluxError| match &on_error_callback {
            Some(on_error_callback) => on_error_callback(error),
            None => collected_errors.push(error),
        };

        loop {
            let next = {
                let cancelled = pin!(cancellation_token.cancelled());
                match select(self.next(), cancelled).await {
                    Either::Left((item, _)) => item,
                    Either::Right(_) => {
                        debug!("subscribe: cancelled");
                        return Ok(());
                    }
                }
            };

            match next {
                Some(StreamItem::Value(value)) => {
                    if let Err(error) = on_next_func(value, cancellation_token.clone()).await {
                        warn!("subscribe: handler failed: {}", error);
                        report(FluxError::user_error(error));
                    }
                }
                Some(StreamItem::Error(error)) => {
                    warn!("subscribe: stream failed: {}", error);
                    report(error);
                    break;
                }
                None => {
                    if let Some(on_complete_callback) = on_complete_callback {
                        on_complete_callback();
                    }
                    break;
                }
            }
        }

        if collected_errors.is_empty() {
            Ok(())
        } else {
            Err(FluxError::from_errors(collected_errors))
        }
    }
}
