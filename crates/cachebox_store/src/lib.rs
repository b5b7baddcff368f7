// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Core store abstractions for the cachebox caching middleware.
//!
//! This crate defines the [`Store`] trait that all cache backends must satisfy,
//! along with [`Item`] for writes, [`Context`] for request-scoped flow control
//! and deadlines, and [`Error`] types for fallible operations.
//!
//! # Overview
//!
//! A [`Store`] is a byte-addressable key/value backend with exactly three
//! batch operations: `mget`, `set` and `delete`. Backends must keep `mget`
//! replies positionally aligned with the requested keys and must distinguish
//! a miss (`None`) from present-but-empty bytes. Network clients for
//! memcached, Redis and friends implement this trait; the `cachebox` crate
//! layers namespace versioning, single-flight and value transforms on top.
//!
//! # Implementing a Store
//!
//! ```
//! use bytes::Bytes;
//! use cachebox_store::{Context, Error, Item, Store};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleStore(RwLock<HashMap<String, Bytes>>);
//!
//! impl Store for SimpleStore {
//!     async fn mget(&self, _ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
//!         let data = self.0.read().map_err(|_| Error::from_message("lock poisoned"))?;
//!         Ok(keys.iter().map(|k| data.get(k).cloned()).collect())
//!     }
//!
//!     async fn set(&self, _ctx: &Context, items: &[Item]) -> Result<(), Error> {
//!         let mut data = self.0.write().map_err(|_| Error::from_message("lock poisoned"))?;
//!         for item in items {
//!             data.insert(item.key().to_owned(), item.value().clone());
//!         }
//!         Ok(())
//!     }
//!
//!     async fn delete(&self, _ctx: &Context, keys: &[String]) -> Result<(), Error> {
//!         let mut data = self.0.write().map_err(|_| Error::from_message("lock poisoned"))?;
//!         for key in keys {
//!             data.remove(key);
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod context;
pub mod error;
mod item;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod store;

mod dynamic;

#[doc(inline)]
pub use context::{Context, FlowMode};
#[doc(inline)]
pub use dynamic::{DynamicStore, DynamicStoreExt};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use item::Item;
#[doc(inline)]
pub use store::Store;
