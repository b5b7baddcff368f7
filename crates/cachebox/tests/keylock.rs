// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for single-flight stampede prevention.

use std::time::Duration;

use cachebox::{Cache, Context, Item};
use cachebox_store::testing::MockStore;
use tick::Clock;

/// Time given to spawned readers to reach their parked state.
const SETTLE: Duration = Duration::from_millis(50);

#[tokio::test(flavor = "multi_thread")]
async fn stampede_is_reduced_to_a_single_recompute() {
    let store = MockStore::with_data([("key2", "ok")]);
    let cache = Cache::builder(Clock::new_frozen()).storage(store).key_lock().build();

    // First caller misses key1 and becomes the designated recomputer.
    let reply = cache
        .get_multi(&Context::new(), &["key1".to_string(), "key2".to_string()])
        .await
        .expect("get_multi failed");
    assert_eq!(reply, vec![None, Some("ok".into())]);

    // Second caller blocks on key1 until the recomputed value is written.
    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .get_multi(&Context::new(), &["key1".to_string(), "key2".to_string()])
                .await
                .expect("get_multi failed")
        })
    };
    tokio::time::sleep(SETTLE).await;
    assert!(!waiter.is_finished());

    cache.set(&Context::new(), Item::new("key1", "debounce")).await.expect("set failed");

    let reply = waiter.await.expect("waiter panicked");
    assert_eq!(reply, vec![Some("debounce".into()), Some("ok".into())]);
}

#[tokio::test(flavor = "multi_thread")]
async fn exactly_one_caller_recomputes() {
    let store = MockStore::new();
    let cache = Cache::builder(Clock::new_frozen()).storage(store).key_lock().build();

    // The designated recomputer sees the miss immediately; everyone else
    // parks until the write below.
    let first = cache.get(&Context::new(), "hot").await.expect("get failed");
    assert!(first.is_none());

    let mut waiters = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        waiters.push(tokio::spawn(async move { cache.get(&Context::new(), "hot").await.expect("get failed") }));
    }
    tokio::time::sleep(SETTLE).await;

    cache.set(&Context::new(), Item::new("hot", "value")).await.expect("set failed");

    for waiter in waiters {
        let out = waiter.await.expect("waiter panicked");
        assert_eq!(out.as_deref(), Some(b"value".as_slice()));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn drained_key_admits_a_new_recomputer_without_blocking() {
    let store = MockStore::new();
    let cache = Cache::builder(Clock::new_frozen()).storage(store).key_lock().build();
    let ctx = Context::new();

    // Full cycle: miss, parked waiter, write, drain.
    assert!(cache.get(&ctx, "key").await.expect("get failed").is_none());
    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(&Context::new(), "key").await.expect("get failed") })
    };
    tokio::time::sleep(SETTLE).await;
    cache.set(&ctx, Item::new("key", "value")).await.expect("set failed");
    assert_eq!(waiter.await.expect("waiter panicked").as_deref(), Some(b"value".as_slice()));

    // After the flight drained, a fresh miss must not block: the caller
    // becomes the new designated recomputer immediately.
    cache.delete(&ctx, "key").await.expect("delete failed");
    let out = tokio::time::timeout(Duration::from_secs(1), cache.get(&ctx, "key"))
        .await
        .expect("fresh miss blocked on a stale flight")
        .expect("get failed");
    assert!(out.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn waiter_with_expired_deadline_reports_a_miss() {
    let clock = Clock::new_frozen();
    let store = MockStore::new();
    let cache = Cache::builder(clock.clone()).storage(store).key_lock().build();

    assert!(cache.get(&Context::new(), "key").await.expect("get failed").is_none());

    // A waiter whose deadline already passed must not park.
    let past = clock.system_time() - Duration::from_secs(1);
    let ctx = Context::new().deadline_at(past);
    let out = tokio::time::timeout(Duration::from_secs(1), cache.get(&ctx, "key"))
        .await
        .expect("expired waiter blocked")
        .expect("get failed");
    assert!(out.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn hits_never_engage_the_lock() {
    let store = MockStore::with_data([("key", "value")]);
    let cache = Cache::builder(Clock::new_frozen()).storage(store).key_lock().build();

    // Two back-to-back reads of a present key both hit without coordination.
    for _ in 0..2 {
        let out = cache.get(&Context::new(), "key").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(b"value".as_slice()));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn waiters_receive_inflated_values_with_gzip_enabled() {
    let store = MockStore::new();
    // The key lock is registered before gzip so parked readers get their
    // result inflated on the way out.
    let cache = Cache::builder(Clock::new_frozen())
        .storage(store)
        .key_lock()
        .gzip_compression(6)
        .build();

    assert!(cache.get(&Context::new(), "key").await.expect("get failed").is_none());

    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(&Context::new(), "key").await.expect("get failed") })
    };
    tokio::time::sleep(SETTLE).await;

    cache.set(&Context::new(), Item::new("key", "debounce")).await.expect("set failed");

    let out = waiter.await.expect("waiter panicked");
    assert_eq!(out.as_deref(), Some(b"debounce".as_slice()));
}
