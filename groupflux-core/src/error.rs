// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for grouped stream processing.
//!
//! Every failure that can travel through a groupflux pipeline is a [`FluxError`].
//! Upstream failures ride in-band as [`StreamItem::Error`](crate::StreamItem::Error)
//! so that a single source error can be fanned out to every live group.
//!
//! # Examples
//!
//! ```
//! use groupflux_core::{FluxError, Result};
//!
//! fn load_rows() -> Result<Vec<u32>> {
//!     Err(FluxError::stream_error("connection reset"))
//! }
//!
//! assert!(load_rows().is_err());
//! ```

/// Root error type for all groupflux operations.
#[derive(Debug, thiserror::Error)]
pub enum FluxError {
    /// Stream processing encountered an error
    ///
    /// General failure raised by a source stream or an operator.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Wraps errors produced by user-provided handlers so they can be
    /// propagated through the pipeline.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Multiple errors occurred
    ///
    /// Aggregates handler failures collected by a subscriber that has no
    /// error callback.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<FluxError>,
    },

    /// A grouped stream was subscribed more than once.
    ///
    /// Each group has exactly one consumer. This is a usage violation and is
    /// reported synchronously to the second caller.
    #[error("Grouped stream for key {key} can only be subscribed once")]
    AlreadySubscribed {
        /// Debug rendering of the group key
        key: String,
    },
}

impl FluxError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Create the usage-violation error for a group that was already subscribed.
    pub fn already_subscribed(key: &impl std::fmt::Debug) -> Self {
        Self::AlreadySubscribed {
            key: format!("{key:?}"),
        }
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    ///
    /// # Examples
    ///
    /// ```
    /// use groupflux_core::FluxError;
    ///
    /// let errors = vec![
    ///     std::io::Error::other("first"),
    ///     std::io::Error::other("second"),
    /// ];
    ///
    /// let result = FluxError::from_user_errors(errors);
    /// assert!(matches!(result, FluxError::MultipleErrors { count: 2, .. }));
    /// ```
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let errors = errors
            .into_iter()
            .map(|e| Self::UserError(Box::new(e)))
            .collect();

        Self::MultipleErrors { count, errors }
    }

    /// Aggregate already converted errors into a `MultipleErrors` variant
    pub fn from_errors(errors: Vec<FluxError>) -> Self {
        Self::MultipleErrors {
            count: errors.len(),
            errors,
        }
    }

    /// Returns `true` for errors caused by misusing the API rather than by data.
    #[must_use]
    pub const fn is_usage_violation(&self) -> bool {
        matches!(self, Self::AlreadySubscribed { .. })
    }
}

/// Specialized Result type for groupflux operations.
pub type Result<T> = std::result::Result<T, FluxError>;

/// Extension trait for converting foreign errors into `FluxError`.
pub trait IntoFluxError {
    /// Convert this error into a `FluxError`, prefixing `context` when it is not empty
    fn into_flux_error(self, context: &str) -> FluxError;

    /// Convert this error into a `FluxError` without additional context
    fn into_flux(self) -> FluxError
    where
        Self: Sized,
    {
        self.into_flux_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFluxError for E {
    fn into_flux_error(self, context: &str) -> FluxError {
        if context.is_empty() {
            FluxError::user_error(self)
        } else {
            FluxError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s.
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(FluxError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(FluxError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FluxError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.with_context(|| context.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            FluxError::UserError(inner) => FluxError::StreamProcessingError {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}

impl Clone for FluxError {
    fn clone(&self) -> Self {
        match self {
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            // Boxed user errors cannot be cloned; keep their message.
            Self::UserError(e) => Self::StreamProcessingError {
                context: format!("User error: {e}"),
            },
            Self::MultipleErrors { count, errors } => Self::MultipleErrors {
                count: *count,
                errors: errors.clone(),
            },
            Self::AlreadySubscribed { key } => Self::AlreadySubscribed { key: key.clone() },
        }
    }
}
