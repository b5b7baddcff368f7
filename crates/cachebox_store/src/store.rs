// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache storage backends.
//!
//! [`Store`] defines the interface that all cache backends must implement.
//! This trait is designed for composition: implement the three batch
//! operations, then use `cachebox` to layer on namespace versioning, hook
//! pipelines and multi-tier fallthrough.

use bytes::Bytes;

use crate::{Context, Error, Item};

/// Trait for byte-addressable key/value backends.
///
/// Implement this trait to plug a backend (memcached, Redis, in-memory, ...)
/// into the cachebox middleware.
///
/// # Contract
///
/// - `mget` replies are positionally aligned: `reply.len() == keys.len()` and
///   `reply[i]` corresponds to `keys[i]`.
/// - A miss is `None`, distinct from `Some` empty bytes.
/// - An [`Item`] TTL of zero means "no explicit expiry" (or the backend's
///   default), applied consistently per backend.
/// - All operations observe the [`Context`] deadline where the backend
///   supports it; callers may also cancel by dropping the future.
#[dynosaur::dynosaur(pub(crate) DynStore = dyn(box) Store, bridge(none))]
pub trait Store: Send + Sync {
    /// Fetches many keys at once, returning one slot per requested key.
    fn mget(&self, ctx: &Context, keys: &[String]) -> impl Future<Output = Result<Vec<Option<Bytes>>, Error>> + Send;

    /// Writes a batch of items, each with its own TTL.
    fn set(&self, ctx: &Context, items: &[Item]) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes a batch of keys.
    fn delete(&self, ctx: &Context, keys: &[String]) -> impl Future<Output = Result<(), Error>> + Send;
}

// Public API tests live in the cachebox crate's integration suite.
