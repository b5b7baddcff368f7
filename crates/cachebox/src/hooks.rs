// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hook pipeline around a store.
//!
//! [`HookedStore`] decorates any [`Store`] with an ordered chain of
//! [`StoreHook`]s. Every value returned by `mget` passes through the
//! after-read hooks, every item about to be written passes through the
//! before-write hooks, and every successfully written item is observed by
//! the after-write hooks. The gzip transform and the single-flight key lock
//! are both expressed as hooks.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;

use cachebox_store::{Context, Error, Item, Store};

/// A transform applied around store reads and writes.
///
/// All three methods default to passthrough, so a hook implements only the
/// sides it cares about. Hooks may suspend: the single-flight coordinator
/// parks concurrent readers inside `after_read`.
///
/// # Contract
///
/// - After-read hooks run per reply slot, in registration order, threading
///   the bytes through. Misses (`None`) are fed through the chain as well;
///   hooks must tolerate them.
/// - Before-write hooks run per item, in registration order, producing the
///   item that is actually written.
/// - After-write hooks observe each item of a successful write.
/// - Any hook error aborts the remainder of the operation and surfaces.
pub trait StoreHook: Send + Sync {
    /// Transforms one reply slot after a read.
    fn after_read<'a>(&'a self, ctx: &'a Context, key: &'a str, value: Option<Bytes>) -> BoxFuture<'a, Result<Option<Bytes>, Error>> {
        let _ = (ctx, key);
        Box::pin(async move { Ok(value) })
    }

    /// Transforms one item before it is written.
    fn before_write<'a>(&'a self, ctx: &'a Context, item: Item) -> BoxFuture<'a, Result<Item, Error>> {
        let _ = ctx;
        Box::pin(async move { Ok(item) })
    }

    /// Observes one item of a successful write.
    fn after_write<'a>(&'a self, ctx: &'a Context, item: &'a Item) -> BoxFuture<'a, Result<(), Error>> {
        let _ = (ctx, item);
        Box::pin(async move { Ok(()) })
    }
}

/// A store wrapped with an ordered hook chain.
///
/// The wrapper is flat by construction: [`with_hook`](Self::with_hook)
/// appends to the existing chain instead of nesting another wrapper, so
/// stacking N registrations yields a single `HookedStore` whose chain is
/// their in-order concatenation.
///
/// Deletes pass through to the inner store unhooked.
#[derive(Clone)]
pub struct HookedStore<S> {
    inner: S,
    hooks: Vec<Arc<dyn StoreHook>>,
}

impl<S> std::fmt::Debug for HookedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookedStore").field("hooks", &self.hooks.len()).finish_non_exhaustive()
    }
}

impl<S: Store> HookedStore<S> {
    /// Wraps a store with an empty hook chain.
    pub fn new(inner: S) -> Self {
        Self { inner, hooks: Vec::new() }
    }

    /// Appends a hook to the chain.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn StoreHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Returns a reference to the wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for HookedStore<S> {
    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
        let mut reply = self.inner.mget(ctx, keys).await?;

        if !self.hooks.is_empty() {
            for (slot, key) in reply.iter_mut().zip(keys) {
                let mut value = slot.take();
                for hook in &self.hooks {
                    value = hook.after_read(ctx, key, value).await?;
                }
                *slot = value;
            }
        }

        Ok(reply)
    }

    async fn set(&self, ctx: &Context, items: &[Item]) -> Result<(), Error> {
        if self.hooks.is_empty() {
            return self.inner.set(ctx, items).await;
        }

        let mut transformed = Vec::with_capacity(items.len());
        for item in items {
            let mut item = item.clone();
            for hook in &self.hooks {
                item = hook.before_write(ctx, item).await?;
            }
            transformed.push(item);
        }

        self.inner.set(ctx, &transformed).await?;

        for item in &transformed {
            for hook in &self.hooks {
                hook.after_write(ctx, item).await?;
            }
        }

        Ok(())
    }

    async fn delete(&self, ctx: &Context, keys: &[String]) -> Result<(), Error> {
        self.inner.delete(ctx, keys).await
    }
}
