// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Namespace-versioned cache handles.
//!
//! A [`NamespaceCache`] binds data keys to a set of *namespace keys*. Each
//! namespace key stores the nanosecond Unix timestamp at which that
//! namespace was last (re)born; the version guarding a data key is the most
//! recent timestamp among its namespaces. Deleting any namespace key
//! logically invalidates every data key bound to it, without enumerating
//! them: the next resolution stamps a strictly newer timestamp, and older
//! payloads are interpreted as misses.
//!
//! Two strategies are supported:
//!
//! - **Recyclable keys** (default): the wire key is fixed
//!   (`cachebox:rk:<key>`) and the version travels as an 8-byte prefix of
//!   the value. The keyspace stays bounded; stale payloads linger until TTL
//!   but read as misses.
//! - **Versioned keys**: the version is embedded in the wire key
//!   (`cachebox:v<version>:<key>`), so every generation uses fresh keys and
//!   old ones die by TTL.
//!
//! A handle resolves its version once, on the first read or write, and keeps
//! it for its lifetime; construct a new handle to observe a fresh version.

use std::{
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::{Duration, SystemTime},
};

use bytes::{BufMut, Bytes, BytesMut};
use tick::Clock;
use tracing::{debug, warn};

use crate::hooks::HookedStore;
use cachebox_store::{Context, Error, Item, Result, Store};

/// Length of the little-endian version tag.
const VERSION_LEN: usize = 8;

/// Builds the wire key for a data key under the recyclable strategy.
///
/// The layout is part of the cross-language wire contract:
/// ASCII `cachebox:rk:` followed by the user key verbatim.
#[must_use]
pub fn recyclable_key(key: &str) -> String {
    format!("cachebox:rk:{key}")
}

/// Builds the wire key for a data key under the versioned strategy.
///
/// The layout is part of the cross-language wire contract: ASCII
/// `cachebox:v`, the base-10 version, `:`, then the user key verbatim.
#[must_use]
pub fn versioned_key(key: &str, version: i64) -> String {
    format!("cachebox:v{version}:{key}")
}

/// Encodes a namespace version as its 8-byte little-endian wire form.
#[must_use]
pub fn encode_version(version: i64) -> Bytes {
    Bytes::copy_from_slice(&version.to_le_bytes())
}

/// Decodes a namespace version from its wire form.
///
/// Returns `None` for values shorter than 8 bytes.
#[must_use]
pub fn decode_version(b: &[u8]) -> Option<i64> {
    if b.len() < VERSION_LEN {
        return None;
    }
    let mut raw = [0u8; VERSION_LEN];
    raw.copy_from_slice(&b[..VERSION_LEN]);
    Some(i64::from_le_bytes(raw))
}

/// Splits a recyclable wire value into its version tag and payload.
fn split_version(b: &Bytes) -> Option<(i64, Bytes)> {
    let version = decode_version(b)?;
    Some((version, b.slice(VERSION_LEN..)))
}

fn now_nanos(clock: &Clock) -> i64 {
    clock
        .system_time()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as i64)
}

/// A cache handle whose reads and writes are guarded by namespace versions.
///
/// Created by [`Cache::namespace`](crate::Cache::namespace). The handle owns
/// a snapshot of the cache configuration (storage, namespace TTL, strategy,
/// clock) plus the ordered namespace key list, and lazily resolves the
/// namespace version on first use.
///
/// The sticky version makes handles cheap in hot paths: once resolved, reads
/// and writes cost a single round trip. Handles are safe to share across
/// tasks; if two tasks race the first resolution, both compute the same max
/// and the only cost is one extra round trip.
///
/// # Examples
///
/// ```ignore
/// let ns = cache.namespace(["user:42"]);
/// ns.set(&ctx, Item::new("profile", payload).with_ttl(ttl)).await?;
/// let hit = ns.get(&ctx, "profile").await?;
///
/// // Invalidate the whole group:
/// cache.delete(&ctx, "user:42").await?;
/// ```
pub struct NamespaceCache<S> {
    storage: Arc<HookedStore<S>>,
    clock: Clock,
    ns_keys: Vec<String>,
    ns_ttl: Duration,
    recyclable: bool,
    /// Resolved namespace version; 0 means not yet resolved.
    version: AtomicI64,
}

impl<S> std::fmt::Debug for NamespaceCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceCache")
            .field("ns_keys", &self.ns_keys)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<S: Store> NamespaceCache<S> {
    pub(crate) fn new(storage: Arc<HookedStore<S>>, clock: Clock, ns_keys: Vec<String>, ns_ttl: Duration, recyclable: bool) -> Self {
        Self {
            storage,
            clock,
            ns_keys,
            ns_ttl,
            recyclable,
            version: AtomicI64::new(0),
        }
    }

    /// Returns the resolved namespace version, or 0 before first use.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version.load(Ordering::Acquire)
    }

    /// Performs a versioned get.
    ///
    /// On the first call the namespace version is resolved; under the
    /// recyclable strategy this folds into a single multi-get together with
    /// the data key. Namespaces found missing are (re)born with a fresh
    /// timestamp before the version is considered resolved.
    ///
    /// Under [`BypassRead`](cachebox_store::FlowMode::BypassRead) or
    /// [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call reports a
    /// miss `Ok(None)` after any version resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; the version is not cached in
    /// that case, so the next call resolves again.
    pub async fn get(&self, ctx: &Context, key: &str) -> Result<Option<Bytes>> {
        let candidate: Option<Bytes>;

        if self.version() == 0 {
            if self.recyclable {
                // One round trip: namespace keys plus the data key.
                let mut keys = self.ns_keys.clone();
                keys.push(recyclable_key(key));

                let mut reply = self.storage.mget(ctx, &keys).await?;
                candidate = reply.pop().flatten();

                let ts = self.most_recent_timestamp(ctx, &reply).await?;
                self.version.store(ts, Ordering::Release);
            } else {
                let reply = self.storage.mget(ctx, &self.ns_keys).await?;
                let ts = self.most_recent_timestamp(ctx, &reply).await?;
                self.version.store(ts, Ordering::Release);

                let mut reply = self.storage.mget(ctx, &[versioned_key(key, ts)]).await?;
                candidate = reply.pop().flatten();
            }
        } else {
            let wire_key = if self.recyclable {
                recyclable_key(key)
            } else {
                versioned_key(key, self.version())
            };

            let mut reply = self.storage.mget(ctx, &[wire_key]).await?;
            candidate = reply.pop().flatten();
        }

        if ctx.suppresses_reads() {
            return Ok(None);
        }

        let Some(b) = candidate else {
            return Ok(None);
        };

        if self.recyclable {
            let Some((stored_version, payload)) = split_version(&b) else {
                warn!(key, len = b.len(), "recyclable value shorter than version tag, treating as miss");
                return Ok(None);
            };

            // The group advanced past this payload's generation.
            if self.version() > stored_version {
                return Ok(None);
            }

            return Ok(Some(payload));
        }

        Ok(Some(b))
    }

    /// Performs a versioned set.
    ///
    /// The item's key is rewritten to the strategy's wire form; under the
    /// recyclable strategy the value is prefixed with the namespace version.
    ///
    /// Under [`BypassAll`](cachebox_store::FlowMode::BypassAll) the call is
    /// skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn set(&self, ctx: &Context, item: Item) -> Result<()> {
        if ctx.suppresses_writes() {
            return Ok(());
        }

        if self.version() == 0 {
            let reply = self.storage.mget(ctx, &self.ns_keys).await?;
            let ts = self.most_recent_timestamp(ctx, &reply).await?;
            self.version.store(ts, Ordering::Release);
        }

        let version = self.version();
        let item = if self.recyclable {
            let mut value = BytesMut::with_capacity(VERSION_LEN + item.value().len());
            value.put_slice(&version.to_le_bytes());
            value.put_slice(item.value());
            let wire_key = recyclable_key(item.key());
            item.with_key(wire_key).with_value(value.freeze())
        } else {
            let wire_key = versioned_key(item.key(), version);
            item.with_key(wire_key)
        };

        self.storage.set(ctx, &[item]).await
    }

    /// Resolves the namespace version from a multi-get reply over the
    /// namespace keys, (re)bearing any missing namespace with the current
    /// clock reading.
    ///
    /// Births are written in one batch before the version is returned; a
    /// failed write propagates and leaves the handle unresolved.
    async fn most_recent_timestamp(&self, ctx: &Context, reply: &[Option<Bytes>]) -> Result<i64> {
        let mut most_recent = 0i64;
        let mut births: Vec<Item> = Vec::new();

        for (ns_key, slot) in self.ns_keys.iter().zip(reply) {
            let timestamp = match slot.as_ref().and_then(|b| decode_version(b)) {
                Some(ts) => ts,
                None => {
                    if slot.is_some() {
                        warn!(ns_key = %ns_key, "malformed namespace value, rebearing");
                    }
                    let now = now_nanos(&self.clock);
                    births.push(Item::new(ns_key.clone(), encode_version(now)).with_ttl(self.ns_ttl));
                    now
                }
            };

            most_recent = most_recent.max(timestamp);
        }

        if !births.is_empty() {
            debug!(count = births.len(), "bearing namespace keys");
            self.storage.set(ctx, &births).await?;
        }

        Ok(most_recent)
    }
}
