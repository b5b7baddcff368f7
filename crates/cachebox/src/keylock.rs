// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Single-flight key lock.
//!
//! [`KeyLock`] serializes recomputation of missing keys across concurrent
//! callers within one process. It is registered as a hook: the after-read
//! side observes every reply slot, the after-write side observes every
//! successful write.
//!
//! The first reader to miss a key becomes the designated recomputer and
//! returns the miss immediately. Readers that miss the same key while the
//! recompute is in flight park until the corresponding write arrives or
//! their deadline passes; a deadline expiry reports a miss, not an error.
//! Cross-process stampedes are out of scope.

use std::{
    collections::HashMap,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use bytes::Bytes;
use event_listener::Event;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tick::{Clock, FutureExt as _};
use tracing::debug;

use crate::hooks::StoreHook;
use cachebox_store::{Context, Error, Item};

/// One in-flight recompute.
///
/// Lives in the map from the first miss until the corresponding write lands
/// with no waiters, or until the last waiter drains.
struct Flight {
    /// Number of parked waiters. Incremented before parking, decremented
    /// under the map lock on wake-up.
    waiters: AtomicUsize,
    /// The written value. Set at most once, by the after-write side.
    result: OnceLock<Bytes>,
    /// Fired once `result` is set.
    ready: Event,
}

impl Flight {
    fn new() -> Self {
        Self {
            waiters: AtomicUsize::new(0),
            result: OnceLock::new(),
            ready: Event::new(),
        }
    }
}

/// Single-flight coordinator over a mutex-protected in-flight map.
pub(crate) struct KeyLock {
    clock: Clock,
    flights: Mutex<HashMap<String, Arc<Flight>>>,
}

impl KeyLock {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            clock,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Parks until the flight's result arrives or the context deadline
    /// passes. Returns the written value, or `None` on deadline.
    async fn wait(&self, ctx: &Context, flight: &Flight) -> Option<Bytes> {
        loop {
            if let Some(result) = flight.result.get() {
                return Some(result.clone());
            }

            // Register before re-checking to avoid a missed notification.
            let listener = flight.ready.listen();

            if let Some(result) = flight.result.get() {
                return Some(result.clone());
            }

            match ctx.deadline() {
                None => listener.await,
                Some(at) => {
                    let Ok(remaining) = at.duration_since(self.clock.system_time()) else {
                        // Deadline already passed.
                        return flight.result.get().cloned();
                    };
                    if listener.timeout(&self.clock, remaining).await.is_err() {
                        return flight.result.get().cloned();
                    }
                }
            }
        }
    }

    /// Removes the flight from the map if it is still the one registered
    /// under `key`. Both unlink sites race; the identity check makes them
    /// idempotent.
    fn unlink(&self, key: &str, flight: &Arc<Flight>) {
        let mut flights = self.flights.lock();
        if let Some(current) = flights.get(key) {
            if Arc::ptr_eq(current, flight) {
                flights.remove(key);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }
}

impl StoreHook for KeyLock {
    fn after_read<'a>(&'a self, ctx: &'a Context, key: &'a str, value: Option<Bytes>) -> BoxFuture<'a, Result<Option<Bytes>, Error>> {
        Box::pin(async move {
            // Hits never touch the in-flight map.
            if value.is_some() {
                return Ok(value);
            }

            let flight = {
                let mut flights = self.flights.lock();
                match flights.get(key) {
                    None => {
                        // This caller is the designated recomputer: install
                        // the flight and surface the miss immediately.
                        flights.insert(key.to_owned(), Arc::new(Flight::new()));
                        debug!(key, "key lock: designated recomputer");
                        return Ok(None);
                    }
                    Some(flight) => Arc::clone(flight),
                }
            };

            flight.waiters.fetch_add(1, Ordering::AcqRel);
            let result = self.wait(ctx, &flight).await;

            // The counter is decremented lock-free; unlink re-checks entry
            // identity under the map lock, so a lost race at worst leaves a
            // stale flight for the next writer to supersede.
            let last_waiter = flight.waiters.fetch_sub(1, Ordering::AcqRel) == 1;
            if last_waiter {
                self.unlink(key, &flight);
            }

            Ok(result)
        })
    }

    fn after_write<'a>(&'a self, _ctx: &'a Context, item: &'a Item) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let flight = {
                let flights = self.flights.lock();
                flights.get(item.key()).map(Arc::clone)
            };

            let Some(flight) = flight else {
                return Ok(());
            };

            let _ = flight.result.set(item.value().clone());
            flight.ready.notify(usize::MAX);
            debug!(key = item.key(), "key lock: released waiters");

            if flight.waiters.load(Ordering::Acquire) == 0 {
                self.unlink(item.key(), &flight);
            }

            Ok(())
        })
    }
}
