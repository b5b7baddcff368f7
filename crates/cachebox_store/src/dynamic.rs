// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dynamic store wrapper for type erasure.

use std::{fmt::Debug, sync::Arc};

use bytes::Bytes;

use crate::{Context, Error, Item, Store, store::DynStore};

/// Extension trait for converting any `Store` into a [`DynamicStore`].
///
/// This trait is automatically implemented for all types that implement
/// [`Store`].
///
/// # Examples
///
/// ```ignore
/// let tiers = vec![l1.into_dynamic(), l2.into_dynamic()];
/// ```
pub trait DynamicStoreExt: Sized {
    /// Converts this store into a [`DynamicStore`].
    fn into_dynamic(self) -> DynamicStore;
}

impl<T> DynamicStoreExt for T
where
    T: Store + 'static,
{
    fn into_dynamic(self) -> DynamicStore {
        DynamicStore::new(self)
    }
}

/// A clonable dynamic store with type erasure.
///
/// `DynamicStore` wraps a trait object in an `Arc` to enable cloning while
/// maintaining dynamic dispatch. Use this to compose heterogeneous backends,
/// e.g. an in-memory tier in front of a remote one.
pub struct DynamicStore(Arc<DynStore<'static>>);

impl DynamicStore {
    pub(crate) fn new<T>(store: T) -> Self
    where
        T: Store + Send + Sync + 'static,
    {
        Self(DynStore::new_arc(store))
    }
}

impl Debug for DynamicStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicStore").finish()
    }
}

impl Clone for DynamicStore {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl Store for DynamicStore {
    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
        self.0.mget(ctx, keys).await
    }

    async fn set(&self, ctx: &Context, items: &[Item]) -> Result<(), Error> {
        self.0.set(ctx, items).await
    }

    async fn delete(&self, ctx: &Context, keys: &[String]) -> Result<(), Error> {
        self.0.delete(ctx, keys).await
    }
}
