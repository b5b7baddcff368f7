// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the cache façade and flow modes.

use std::time::Duration;

use cachebox::{Cache, Context, Item};
use cachebox_store::testing::{MockStore, StoreOp};
use tick::Clock;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

#[test]
fn get_is_a_single_key_mget() {
    block_on(async {
        let store = MockStore::with_data([("key", "value")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).build();

        let out = cache.get(&Context::new(), "key").await.expect("get failed");

        assert_eq!(out.as_deref(), Some(b"value".as_slice()));
        assert_eq!(store.operations(), vec![StoreOp::MGet(vec!["key".to_string()])]);
    });
}

#[test]
fn get_miss_returns_none() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store).build();

        let out = cache.get(&Context::new(), "absent").await.expect("get failed");
        assert!(out.is_none());
    });
}

#[test]
fn get_multi_preserves_alignment() {
    block_on(async {
        let store = MockStore::with_data([("a", "1"), ("c", "3")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store).build();

        let reply = cache
            .get_multi(&Context::new(), &["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .expect("get_multi failed");

        assert_eq!(reply.len(), 3);
        assert_eq!(reply[0].as_deref(), Some(b"1".as_slice()));
        assert!(reply[1].is_none());
        assert_eq!(reply[2].as_deref(), Some(b"3".as_slice()));
    });
}

#[test]
fn set_multi_forwards_one_batch() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).build();

        let items = [
            Item::new("a", "1").with_ttl(Duration::from_secs(60)),
            Item::new("b", "2"),
        ];
        cache.set_multi(&Context::new(), &items).await.expect("set_multi failed");

        assert_eq!(store.operations(), vec![StoreOp::Set(items.to_vec())]);
    });
}

#[test]
fn delete_multi_forwards_one_batch() {
    block_on(async {
        let store = MockStore::with_data([("a", "1"), ("b", "2")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).build();

        cache
            .delete_multi(&Context::new(), &["a".to_string(), "b".to_string()])
            .await
            .expect("delete_multi failed");

        assert_eq!(store.entry_count(), 0);
        assert_eq!(store.operations(), vec![StoreOp::Delete(vec!["a".to_string(), "b".to_string()])]);
    });
}

#[test]
fn bypass_read_fakes_misses_but_writes_reach_the_store() {
    block_on(async {
        let store = MockStore::with_data([("key", "value")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).build();
        let ctx = Context::new().bypass_read();

        // Reads short-circuit before any store call.
        assert!(cache.get(&ctx, "key").await.expect("get failed").is_none());
        let reply = cache.get_multi(&ctx, &["key".to_string()]).await.expect("get_multi failed");
        assert_eq!(reply, vec![None]);
        assert!(store.operations().is_empty());

        // Writes and deletes still happen.
        cache.set(&ctx, Item::new("new", "value")).await.expect("set failed");
        assert!(store.contains_key("new"));

        cache.delete(&ctx, "key").await.expect("delete failed");
        assert!(!store.contains_key("key"));
    });
}

#[test]
fn bypass_all_reaches_the_store_zero_times() {
    block_on(async {
        let store = MockStore::with_data([("key", "value")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).build();
        let ctx = Context::new().bypass_all();

        assert!(cache.get(&ctx, "key").await.expect("get failed").is_none());
        let reply = cache.get_multi(&ctx, &["key".to_string(), "other".to_string()]).await.expect("get_multi failed");
        assert_eq!(reply, vec![None, None]);

        cache.set(&ctx, Item::new("new", "value")).await.expect("set failed");
        cache.set_multi(&ctx, &[Item::new("more", "value")]).await.expect("set_multi failed");
        cache.delete(&ctx, "key").await.expect("delete failed");
        cache.delete_multi(&ctx, &["key".to_string()]).await.expect("delete_multi failed");

        assert!(store.operations().is_empty());
        assert!(store.contains_key("key"));
        assert!(!store.contains_key("new"));
    });
}

#[test]
fn store_errors_surface_verbatim() {
    block_on(async {
        let store = MockStore::new();
        store.fail_when(|op| matches!(op, StoreOp::MGet(_)));
        let cache = Cache::builder(Clock::new_frozen()).storage(store).build();

        assert!(cache.get(&Context::new(), "key").await.is_err());
    });
}

#[test]
fn clones_share_the_underlying_store() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store).build();
        let clone = cache.clone();

        cache.set(&Context::new(), Item::new("key", "value")).await.expect("set failed");

        let out = clone.get(&Context::new(), "key").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(b"value".as_slice()));
    });
}

#[test]
fn telemetry_option_composes() {
    block_on(async {
        let meter = opentelemetry_meter();
        let telemetry = cachebox::CacheTelemetry::new(&meter);
        let store = MockStore::with_data([("key", "value")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store).telemetry(telemetry).build();

        // Recording on a no-op meter must not disturb the operation.
        let out = cache.get(&Context::new(), "key").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(b"value".as_slice()));
        assert!(cache.get(&Context::new(), "absent").await.expect("get failed").is_none());
    });
}

fn opentelemetry_meter() -> opentelemetry::metrics::Meter {
    opentelemetry::global::meter("cachebox-tests")
}
