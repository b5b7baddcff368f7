// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for store and cache operations.

use std::error::Error as StdError;

/// An error from a store or cache operation.
///
/// Wraps any underlying error from a backend or hook while preserving the
/// ability to extract the original typed error.
///
/// # For `Store` Implementers
///
/// Wrap your backend-specific errors using [`from_source`](Self::from_source):
///
/// ```ignore
/// impl Store for RedisStore {
///     async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>> {
///         self.client.mget(keys).await.map_err(Error::from_source)
///     }
/// }
/// ```
///
/// # For Consumers
///
/// Extract the underlying error using [`source_as`](Self::source_as):
///
/// ```ignore
/// match cache.get(&ctx, "key").await {
///     Err(e) if e.is_source::<redis::RedisError>() => { /* backend trouble */ }
///     Err(e) => { /* anything else */ }
///     Ok(v) => { /* hit or miss */ }
/// }
/// ```
#[ohno::error]
#[derive(Clone)]
pub struct Error;

impl Error {
    /// Creates a new error wrapping a source error.
    ///
    /// This preserves the original error type for later extraction via
    /// [`source_as`](Self::source_as).
    ///
    /// # Examples
    ///
    /// ```
    /// use cachebox_store::Error;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    /// let error = Error::from_source(io_err);
    /// assert!(error.source_as::<std::io::Error>().is_some());
    /// ```
    pub fn from_source(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }

    /// Creates a new error from a message string.
    ///
    /// Use [`from_source`](Self::from_source) instead when wrapping an
    /// existing error.
    pub fn from_message(message: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::caused_by(message)
    }

    /// Returns `true` if the source error is of type `T`.
    #[must_use]
    pub fn is_source<T: StdError + 'static>(&self) -> bool {
        self.source_as::<T>().is_some()
    }

    /// Returns the source error as type `T` if it matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachebox_store::Error;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    /// let error = Error::from_source(io_err);
    ///
    /// if let Some(io_err) = error.source_as::<std::io::Error>() {
    ///     assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
    /// }
    /// ```
    #[must_use]
    pub fn source_as<T: StdError + 'static>(&self) -> Option<&T> {
        self.source().and_then(|s| s.downcast_ref::<T>())
    }
}

/// A specialized [`Result`] type for store and cache operations.
pub type Result<T> = std::result::Result<T, Error>;
