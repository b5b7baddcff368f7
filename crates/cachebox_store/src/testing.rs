// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides [`MockStore`], a configurable in-memory store that
//! records all operations and supports failure injection for testing error
//! paths.

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{Context, Error, Item, Store};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A multi-get was performed with the given keys.
    MGet(Vec<String>),
    /// A batch write was performed with the given items.
    Set(Vec<Item>),
    /// A batch delete was performed with the given keys.
    Delete(Vec<String>),
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// This store keeps values in memory and can be configured to fail
/// operations on demand, making it useful for testing error handling paths.
/// All operations are recorded for later verification; clones share the same
/// backing data and log.
///
/// # Examples
///
/// ```no_run
/// use cachebox_store::{Context, Item, Store, testing::{MockStore, StoreOp}};
///
/// # async fn example() {
/// let store = MockStore::new();
/// let ctx = Context::new();
///
/// store.set(&ctx, &[Item::new("key", "value")]).await.unwrap();
/// let reply = store.mget(&ctx, &["key".to_string()]).await.unwrap();
/// assert_eq!(reply[0].as_deref(), Some(b"value".as_slice()));
///
/// // Verify operations
/// assert_eq!(store.operations(), vec![
///     StoreOp::Set(vec![Item::new("key", "value")]),
///     StoreOp::MGet(vec!["key".to_string()]),
/// ]);
/// # }
/// ```
///
/// # Failure Injection
///
/// ```no_run
/// use cachebox_store::{Context, Store, testing::{MockStore, StoreOp}};
///
/// # async fn example() {
/// let store = MockStore::new();
/// let ctx = Context::new();
///
/// // Fail all multi-gets
/// store.fail_when(|op| matches!(op, StoreOp::MGet(_)));
/// assert!(store.mget(&ctx, &["key".to_string()]).await.is_err());
/// # }
/// ```
pub struct MockStore {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl Clone for MockStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a mock store with pre-populated data.
    #[must_use]
    pub fn with_data<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns a copy of the value stored under the given key.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should
    /// fail. Failed operations are still recorded.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self, op: &StoreOp) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

impl Store for MockStore {
    async fn mget(&self, _ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
        let op = StoreOp::MGet(keys.to_vec());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("mock: mget failed"));
        }
        self.record(op);
        let data = self.data.lock();
        Ok(keys.iter().map(|k| data.get(k).cloned()).collect())
    }

    async fn set(&self, _ctx: &Context, items: &[Item]) -> Result<(), Error> {
        let op = StoreOp::Set(items.to_vec());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("mock: set failed"));
        }
        self.record(op);
        let mut data = self.data.lock();
        for item in items {
            data.insert(item.key().to_owned(), item.value().clone());
        }
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, keys: &[String]) -> Result<(), Error> {
        let op = StoreOp::Delete(keys.to_vec());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("mock: delete failed"));
        }
        self.record(op);
        let mut data = self.data.lock();
        for key in keys {
            data.remove(key);
        }
        Ok(())
    }
}
