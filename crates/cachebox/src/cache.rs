// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache façade.
//!
//! [`Cache`] is a thin layer over a (possibly hooked) store that honors the
//! per-call [`FlowMode`](cachebox_store::FlowMode) and hands out namespace
//! handles. All flow-mode short-circuits happen before any store call.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tick::{Clock, Stopwatch};

use crate::{builder::CacheBuilder, hooks::HookedStore, namespace::NamespaceCache, telemetry::CacheTelemetry};
use cachebox_store::{Context, Item, Result, Store};

/// Client-side cache over a byte store.
///
/// The façade exposes the six flow-mode-aware operations plus the
/// [`namespace`](Self::namespace) factory. Construct it through
/// [`Cache::builder`]; options install hooks (gzip compression, key lock)
/// and namespace defaults.
///
/// Clones share the underlying store and hook chain.
///
/// # Examples
///
/// ```ignore
/// let clock = Clock::new_tokio();
/// let cache = Cache::builder(clock)
///     .storage(memcached)
///     .key_lock()
///     .gzip_compression(6)
///     .build();
///
/// let ctx = Context::new();
/// cache.set(&ctx, Item::new("key", "value").with_ttl(ttl)).await?;
/// let value = cache.get(&ctx, "key").await?;
/// ```
pub struct Cache<S> {
    pub(crate) storage: Arc<HookedStore<S>>,
    pub(crate) clock: Clock,
    pub(crate) ns_ttl: Duration,
    pub(crate) recyclable: bool,
    pub(crate) telemetry: Option<CacheTelemetry>,
}

impl<S> Clone for Cache<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            clock: self.clock.clone(),
            ns_ttl: self.ns_ttl,
            recyclable: self.recyclable,
            telemetry: self.telemetry.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("ns_ttl", &self.ns_ttl)
            .field("recyclable", &self.recyclable)
            .finish_non_exhaustive()
    }
}

impl Cache<()> {
    /// Creates a new cache builder.
    #[must_use]
    pub fn builder(clock: Clock) -> CacheBuilder<()> {
        CacheBuilder::new(clock)
    }
}

impl<S: Store> Cache<S> {
    /// Returns a reference to the cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns a reference to the hooked store the façade operates on.
    #[must_use]
    pub fn storage(&self) -> &HookedStore<S> {
        &self.storage
    }

    /// Retrieves a single key.
    ///
    /// Returns `Ok(None)` on a miss. Under a read-suppressing flow mode the
    /// call short-circuits to a miss without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or a hook fails.
    pub async fn get(&self, ctx: &Context, key: &str) -> Result<Option<Bytes>> {
        if ctx.suppresses_reads() {
            return Ok(None);
        }

        let watch = Stopwatch::new(&self.clock);
        let keys = [key.to_owned()];
        let result = self.storage.mget(ctx, &keys).await;
        let result = result.map(|reply| reply.into_iter().next().flatten());

        if let Some(telemetry) = &self.telemetry {
            let outcome = match &result {
                Ok(Some(_)) => "hit",
                Ok(None) => "miss",
                Err(_) => "error",
            };
            telemetry.record("get", outcome, watch.elapsed());
        }

        result
    }

    /// Retrieves many keys, one reply slot per key.
    ///
    /// Under a read-suppressing flow mode the call short-circuits to a
    /// full-length all-miss reply without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or a hook fails.
    pub async fn get_multi(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>> {
        if ctx.suppresses_reads() {
            return Ok(vec![None; keys.len()]);
        }

        let watch = Stopwatch::new(&self.clock);
        let result = self.storage.mget(ctx, keys).await;

        if let Some(telemetry) = &self.telemetry {
            let outcome = if result.is_ok() { "ok" } else { "error" };
            telemetry.record("get_multi", outcome, watch.elapsed());
        }

        result
    }

    /// Writes a single item.
    ///
    /// Under [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call is
    /// skipped without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or a hook fails.
    pub async fn set(&self, ctx: &Context, item: Item) -> Result<()> {
        if ctx.suppresses_writes() {
            return Ok(());
        }

        let watch = Stopwatch::new(&self.clock);
        let result = self.storage.set(ctx, std::slice::from_ref(&item)).await;

        if let Some(telemetry) = &self.telemetry {
            let outcome = if result.is_ok() { "ok" } else { "error" };
            telemetry.record("set", outcome, watch.elapsed());
        }

        result
    }

    /// Writes a batch of items in a single store call.
    ///
    /// Under [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call is
    /// skipped without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or a hook fails.
    pub async fn set_multi(&self, ctx: &Context, items: &[Item]) -> Result<()> {
        if ctx.suppresses_writes() {
            return Ok(());
        }

        let watch = Stopwatch::new(&self.clock);
        let result = self.storage.set(ctx, items).await;

        if let Some(telemetry) = &self.telemetry {
            let outcome = if result.is_ok() { "ok" } else { "error" };
            telemetry.record("set_multi", outcome, watch.elapsed());
        }

        result
    }

    /// Deletes a single key.
    ///
    /// Deleting a namespace key invalidates every data key bound to that
    /// namespace: the next handle that resolves the namespace stamps a
    /// strictly newer version.
    ///
    /// Under [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call is
    /// skipped without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        if ctx.suppresses_writes() {
            return Ok(());
        }

        let keys = [key.to_owned()];
        self.delete_batch(ctx, &keys, "delete").await
    }

    /// Deletes a batch of keys.
    ///
    /// Under [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call is
    /// skipped without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn delete_multi(&self, ctx: &Context, keys: &[String]) -> Result<()> {
        if ctx.suppresses_writes() {
            return Ok(());
        }

        self.delete_batch(ctx, keys, "delete_multi").await
    }

    async fn delete_batch(&self, ctx: &Context, keys: &[String], operation: &'static str) -> Result<()> {
        let watch = Stopwatch::new(&self.clock);
        let result = self.storage.delete(ctx, keys).await;

        if let Some(telemetry) = &self.telemetry {
            let outcome = if result.is_ok() { "ok" } else { "error" };
            telemetry.record(operation, outcome, watch.elapsed());
        }

        result
    }

    /// Creates a namespace handle over the given namespace keys.
    ///
    /// The handle snapshots this cache's configuration (store, namespace
    /// TTL, strategy, clock) and resolves its version lazily on first use.
    pub fn namespace<I, K>(&self, ns_keys: I) -> NamespaceCache<S>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        NamespaceCache::new(
            Arc::clone(&self.storage),
            self.clock.clone(),
            ns_keys.into_iter().map(Into::into).collect(),
            self.ns_ttl,
            self.recyclable,
        )
    }
}
