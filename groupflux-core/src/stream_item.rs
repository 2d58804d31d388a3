// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::FluxError;

/// What a groupflux stream yields: a value, or the error that ends the stream.
///
/// Keeping errors in-band lets `group_by` hand one upstream failure to the
/// outer stream and to every live group alike.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    /// A successful value
    Value(T),
    /// An error that terminates the stream
    Error(FluxError),
}

/// Values compare by content. Two errors never compare equal.
impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (Self::Value(a), Self::Value(b)) if a == b)
    }
}

impl<T> StreamItem<T> {
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Same as `Result::from(self)`.
    pub fn into_result(self) -> Result<T, FluxError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Error(error) => Err(error),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn err(self) -> Option<FluxError> {
        self.into_result().err()
    }

    /// Transform the value; an error passes through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StreamItem<U> {
        self.into_result().map(f).into()
    }

    /// Like [`map`](Self::map), for transformations that may themselves fail.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> StreamItem<U>) -> StreamItem<U> {
        match self {
            Self::Value(value) => f(value),
            Self::Error(error) => StreamItem::Error(error),
        }
    }

    /// # Panics
    ///
    /// Panics if the item is an `Error`.
    pub fn unwrap(self) -> T {
        self.into_result()
            .unwrap_or_else(|e| panic!("called `StreamItem::unwrap()` on an `Error` value: {e:?}"))
    }

    /// # Panics
    ///
    /// Panics with `msg` if the item is an `Error`.
    pub fn expect(self, msg: &str) -> T {
        self.into_result()
            .unwrap_or_else(|e| panic!("{msg}: {e:?}"))
    }
}

impl<T> From<Result<T, FluxError>> for StreamItem<T> {
    fn from(result: Result<T, FluxError>) -> Self {
        result.map_or_else(Self::Error, Self::Value)
    }
}

impl<T> From<StreamItem<T>> for Result<T, FluxError> {
    fn from(item: StreamItem<T>) -> Self {
        item.into_result()
    }
}
