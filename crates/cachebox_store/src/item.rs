// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use bytes::Bytes;

/// An item to be written to a cache store.
///
/// `Item` pairs a key with its value bytes and a per-item time-to-live.
/// A TTL of zero (the default) means "no explicit expiry": the backend
/// applies its own default behavior.
///
/// # Examples
///
/// ```
/// use cachebox_store::Item;
/// use std::time::Duration;
///
/// let item = Item::new("user:42", "payload");
/// assert_eq!(item.ttl(), Duration::ZERO);
///
/// let item = Item::new("user:42", "payload").with_ttl(Duration::from_secs(60));
/// assert_eq!(item.ttl(), Duration::from_secs(60));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    key: String,
    value: Bytes,
    ttl: Duration,
}

impl Item {
    /// Creates a new item with no explicit expiry.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: Duration::ZERO,
        }
    }

    /// Sets the time-to-live for this item.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the key, keeping value and TTL.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replaces the value bytes, keeping key and TTL.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value bytes.
    #[must_use]
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Returns the time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
