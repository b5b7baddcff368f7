// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.
//!
//! This crate provides an in-memory [`Store`] backend built on the moka
//! crate, which offers high-performance concurrent caching with eviction
//! policies. It is useful as the fastest tier of a tiered setup, for demos,
//! and for tests that want realistic store behavior without a network.

use std::time::{Duration, Instant};

use bytes::Bytes;
use cachebox_store::{Context, Error, Item, Store};
use moka::{Expiry, future::Cache};

/// A stored value together with its own expiry.
#[derive(Clone, Debug)]
struct Stored {
    value: Bytes,
    ttl: Option<Duration>,
}

/// Expiry policy that honors each item's TTL.
struct PerItemExpiry;

impl Expiry<String, Stored> for PerItemExpiry {
    fn expire_after_create(&self, _key: &String, value: &Stored, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }
}

/// An in-memory store backed by moka.
///
/// Items written with a zero TTL never expire (they may still be evicted
/// once capacity is reached); any other TTL is honored per item.
///
/// # Examples
///
/// ```
/// use cachebox_memory::InMemoryStore;
/// use cachebox_store::{Context, Item, Store};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachebox_store::Error> {
///
/// let store = InMemoryStore::new();
/// let ctx = Context::new();
///
/// store.set(&ctx, &[Item::new("key", "value")]).await?;
/// let reply = store.mget(&ctx, &["key".to_string()]).await?;
/// assert_eq!(reply[0].as_deref(), Some(b"value".as_slice()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    inner: Cache<String, Stored>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new unbounded in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().expire_after(PerItemExpiry).build(),
        }
    }

    /// Creates a new in-memory store with a maximum capacity.
    ///
    /// Once the capacity is reached, entries are evicted using moka's
    /// `TinyLFU` policy.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).expire_after(PerItemExpiry).build(),
        }
    }

    /// Returns the number of entries currently held.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Store for InMemoryStore {
    async fn mget(&self, _ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
        let mut reply = Vec::with_capacity(keys.len());
        for key in keys {
            reply.push(self.inner.get(key).await.map(|stored| stored.value));
        }
        Ok(reply)
    }

    async fn set(&self, _ctx: &Context, items: &[Item]) -> Result<(), Error> {
        for item in items {
            let ttl = (item.ttl() > Duration::ZERO).then(|| item.ttl());
            let stored = Stored {
                value: item.value().clone(),
                ttl,
            };
            self.inner.insert(item.key().to_owned(), stored).await;
        }
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, keys: &[String]) -> Result<(), Error> {
        for key in keys {
            self.inner.invalidate(key).await;
        }
        Ok(())
    }
}
