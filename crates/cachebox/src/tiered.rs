// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Multi-tier store composition.
//!
//! [`TieredStore`] presents an ordered list of stores as one store. Reads
//! walk the tiers left to right, re-issuing only the still-missing keys;
//! writes and deletes fan out to every tier in order.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use cachebox_store::{Context, DynamicStore, Error, Item, Store};

/// A store composed of an ordered list of backing stores.
///
/// # Semantics
///
/// - `mget` asks the first tier for everything, then each subsequent tier
///   for the keys still missing, slotting hits back into their original
///   positions. There is no promotion into earlier tiers. Any tier error
///   aborts the read.
/// - `set` and `delete` forward the full batch to every tier in order and
///   stop at the first error; no compensation is attempted on later tiers.
///
/// # Examples
///
/// ```ignore
/// let store = TieredStore::new(vec![
///     memory.into_dynamic(),
///     memcached.into_dynamic(),
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct TieredStore {
    tiers: Vec<DynamicStore>,
}

impl TieredStore {
    /// Creates a tiered store over the given tiers, first tier first.
    ///
    /// # Panics
    ///
    /// Panics if `tiers` is empty.
    #[must_use]
    pub fn new(tiers: Vec<DynamicStore>) -> Self {
        assert!(!tiers.is_empty(), "TieredStore requires at least one tier");
        Self { tiers }
    }

    /// Returns the number of tiers.
    #[must_use]
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }
}

impl Store for TieredStore {
    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Bytes>>, Error> {
        let mut reply = self.tiers[0].mget(ctx, keys).await?;

        let mut missing: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (i, slot) in reply.iter().enumerate() {
            if slot.is_none() {
                positions.insert(keys[i].clone(), i);
                missing.push(keys[i].clone());
            }
        }

        if missing.is_empty() {
            return Ok(reply);
        }

        for tier in &self.tiers[1..] {
            debug!(remaining = missing.len(), "tiered store falling through");
            let tier_reply = tier.mget(ctx, &missing).await?;

            let mut still_missing = Vec::with_capacity(missing.len() / 2);
            for (key, slot) in missing.into_iter().zip(tier_reply) {
                match slot {
                    Some(value) => reply[positions[&key]] = Some(value),
                    None => still_missing.push(key),
                }
            }

            missing = still_missing;
            if missing.is_empty() {
                break;
            }
        }

        Ok(reply)
    }

    async fn set(&self, ctx: &Context, items: &[Item]) -> Result<(), Error> {
        for tier in &self.tiers {
            tier.set(ctx, items).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, keys: &[String]) -> Result<(), Error> {
        for tier in &self.tiers {
            tier.delete(ctx, keys).await?;
        }
        Ok(())
    }
}
