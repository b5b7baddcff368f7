// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Client-side caching middleware with namespace versioning, single-flight
//! stampede prevention, value transforms and tiered storage.
//!
//! This crate sits between an application and one or more remote
//! byte-addressable key/value stores (memcached, Redis, ...) and layers
//! semantics on top of the transport:
//!
//! - **Namespace invalidation by versioning.** Keys are grouped by namespace
//!   keys; deleting a namespace key invalidates every data key bound to it
//!   without enumerating them. See [`NamespaceCache`].
//! - **Single-flight.** When a hot key misses, only the first caller
//!   recomputes; concurrent callers wait for the write or their deadline.
//!   Enabled with [`CacheBuilder::key_lock`].
//! - **Request-scoped flow control.** A per-call [`Context`] can suppress
//!   reads ([`Context::bypass_read`]) or reads and writes
//!   ([`Context::bypass_all`]).
//! - **Value transforms.** Ordered [`StoreHook`] chains run around every
//!   read and write; gzip compression is built in
//!   ([`CacheBuilder::gzip_compression`]).
//! - **Tiered storage.** [`TieredStore`] chains several backends; reads fall
//!   through on misses, writes fan out.
//!
//! # Example
//!
//! ```ignore
//! use cachebox::{Cache, Context, Item};
//! use std::time::Duration;
//!
//! let cache = Cache::builder(clock)
//!     .storage(memcached)
//!     .key_lock()
//!     .build();
//!
//! let ctx = Context::new();
//! let ns = cache.namespace(["posts", "user:42"]);
//!
//! match ns.get(&ctx, "timeline").await {
//!     Ok(Some(payload)) => { /* hit */ }
//!     // A failed namespace read is best treated as a miss: recompute and
//!     // try to repopulate.
//!     Ok(None) | Err(_) => {
//!         let fresh = recompute_timeline();
//!         ns.set(&ctx, Item::new("timeline", fresh).with_ttl(Duration::from_secs(60))).await?;
//!     }
//! }
//! ```

pub mod builder;
mod cache;
pub mod codec;
mod gzip;
mod hooks;
mod keylock;
pub mod namespace;
mod telemetry;
mod tiered;

#[doc(inline)]
pub use builder::CacheBuilder;
#[doc(inline)]
pub use cache::Cache;
#[doc(inline)]
pub use cachebox_store::{Context, DynamicStore, DynamicStoreExt, Error, FlowMode, Item, Result, Store};
#[doc(inline)]
pub use gzip::InvalidCompressionLevel;
#[doc(inline)]
pub use hooks::{HookedStore, StoreHook};
#[doc(inline)]
pub use namespace::NamespaceCache;
#[doc(inline)]
pub use telemetry::CacheTelemetry;
#[doc(inline)]
pub use tiered::TieredStore;
