// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache builder.
//!
//! The builder configures the store, the hook chain and the namespace
//! defaults before constructing a [`Cache`]. Options compose in any order;
//! hooks run in registration order and toggles are last-write-wins.

use std::{sync::Arc, time::Duration};

use tick::Clock;

use crate::{
    Cache,
    gzip::GzipHook,
    hooks::{HookedStore, StoreHook},
    keylock::KeyLock,
    telemetry::CacheTelemetry,
    tiered::TieredStore,
};
use cachebox_store::{DynamicStore, Store};

/// Default TTL applied to namespace keys born by this cache.
const DEFAULT_NAMESPACE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Builder for [`Cache`].
///
/// Created by [`Cache::builder`]. The storage backend is chosen with
/// [`storage`](Self::storage) or [`tiered`](Self::tiered); the remaining
/// options decorate it.
///
/// # Examples
///
/// ```ignore
/// let cache = Cache::builder(clock)
///     .storage(redis)
///     .key_lock()
///     .gzip_compression(6)
///     .namespace_ttl(Duration::from_secs(3600))
///     .build();
/// ```
pub struct CacheBuilder<S = ()> {
    storage: S,
    clock: Clock,
    ns_ttl: Duration,
    recyclable: bool,
    hooks: Vec<Arc<dyn StoreHook>>,
    telemetry: Option<CacheTelemetry>,
}

impl<S> std::fmt::Debug for CacheBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("ns_ttl", &self.ns_ttl)
            .field("recyclable", &self.recyclable)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl CacheBuilder<()> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            storage: (),
            clock,
            ns_ttl: DEFAULT_NAMESPACE_TTL,
            recyclable: true,
            hooks: Vec::new(),
            telemetry: None,
        }
    }

    /// Sets the storage backend for the cache.
    pub fn storage<S: Store>(self, storage: S) -> CacheBuilder<S> {
        CacheBuilder {
            storage,
            clock: self.clock,
            ns_ttl: self.ns_ttl,
            recyclable: self.recyclable,
            hooks: self.hooks,
            telemetry: self.telemetry,
        }
    }

    /// Sets a tiered storage backend over the given tiers, first tier first.
    ///
    /// # Panics
    ///
    /// Panics if `tiers` is empty.
    pub fn tiered(self, tiers: Vec<DynamicStore>) -> CacheBuilder<TieredStore> {
        self.storage(TieredStore::new(tiers))
    }
}

impl<S> CacheBuilder<S> {
    /// Enables the single-flight key lock.
    ///
    /// The first reader that misses a key recomputes; concurrent readers of
    /// the same key wait until the corresponding write or their deadline.
    ///
    /// When combined with [`gzip_compression`](Self::gzip_compression),
    /// enable the key lock first so waiters receive inflated values.
    #[must_use]
    pub fn key_lock(mut self) -> Self {
        self.hooks.push(Arc::new(KeyLock::new(self.clock.clone())));
        self
    }

    /// Enables gzip compression of values at the given level (0–9).
    ///
    /// An out-of-range level fails at write time; reads pass unrecognized
    /// (uncompressed) values through unchanged.
    #[must_use]
    pub fn gzip_compression(mut self, level: u32) -> Self {
        self.hooks.push(Arc::new(GzipHook::new(level)));
        self
    }

    /// Switches namespace handles to the versioned-key strategy.
    ///
    /// Given a key `cachekey` and a namespace resolving to version `1`, the
    /// wire key becomes `cachebox:v1:cachekey`; after an invalidation the
    /// next generation writes `cachebox:v2:cachekey`, and old keys expire by
    /// TTL. By default the recyclable-key strategy is used instead, which
    /// keeps the keyspace bounded.
    #[must_use]
    pub fn key_based_expiration(mut self) -> Self {
        self.recyclable = false;
        self
    }

    /// Sets the TTL for namespace keys born by this cache.
    ///
    /// Default is 12 hours.
    #[must_use]
    pub fn namespace_ttl(mut self, ttl: Duration) -> Self {
        self.ns_ttl = ttl;
        self
    }

    /// Attaches telemetry to the façade.
    #[must_use]
    pub fn telemetry(mut self, telemetry: CacheTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Returns a reference to the builder's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<S: Store> CacheBuilder<S> {
    /// Builds the cache.
    ///
    /// All registered hooks land in one flat [`HookedStore`] wrapper, in
    /// registration order.
    #[must_use]
    pub fn build(self) -> Cache<S> {
        let mut storage = HookedStore::new(self.storage);
        for hook in self.hooks {
            storage = storage.with_hook(hook);
        }

        Cache {
            storage: Arc::new(storage),
            clock: self.clock,
            ns_ttl: self.ns_ttl,
            recyclable: self.recyclable,
            telemetry: self.telemetry,
        }
    }
}
