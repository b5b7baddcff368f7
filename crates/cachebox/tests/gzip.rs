// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the gzip transform through the cache façade.

use bytes::Bytes;
use cachebox::{Cache, Context, InvalidCompressionLevel, Item};
use cachebox_store::testing::MockStore;
use tick::Clock;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

#[test]
fn values_are_compressed_on_the_wire_and_inflated_on_read() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).gzip_compression(6).build();
        let ctx = Context::new();

        let payload = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(8);
        cache.set(&ctx, Item::new("key", payload.clone())).await.expect("set failed");

        // The stored bytes are a gzip container, not the plaintext.
        let on_wire = store.value_of("key").expect("value missing");
        assert_eq!(&on_wire[..2], &[0x1f, 0x8b]);
        assert!(on_wire.len() < payload.len());

        let out = cache.get(&ctx, "key").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(payload.as_bytes()));
    });
}

#[test]
fn legacy_uncompressed_values_pass_through() {
    block_on(async {
        // A value written before compression was enabled.
        let store = MockStore::with_data([("legacy", "plain value")]);
        let cache = Cache::builder(Clock::new_frozen()).storage(store).gzip_compression(6).build();

        let out = cache.get(&Context::new(), "legacy").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(b"plain value".as_slice()));
    });
}

#[test]
fn misses_are_untouched() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store).gzip_compression(6).build();

        let out = cache.get(&Context::new(), "absent").await.expect("get failed");
        assert!(out.is_none());
    });
}

#[test]
fn invalid_level_fails_at_write_time() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).gzip_compression(99).build();

        let err = cache.set(&Context::new(), Item::new("key", "value")).await.expect_err("level 99 should fail");
        assert!(err.is_source::<InvalidCompressionLevel>());

        // The write never reached the store.
        assert!(store.operations().is_empty());

        // Reads stay tolerant even with the bad level configured.
        let out = cache.get(&Context::new(), "key").await.expect("get failed");
        assert!(out.is_none());
    });
}

#[test]
fn empty_values_are_not_compressed() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).gzip_compression(9).build();
        let ctx = Context::new();

        cache.set(&ctx, Item::new("empty", Bytes::new())).await.expect("set failed");

        // The wire value stays empty instead of becoming a gzip container.
        assert_eq!(store.value_of("empty").as_deref(), Some(b"".as_slice()));

        let out = cache.get(&ctx, "empty").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(b"".as_slice()));
    });
}

#[test]
fn namespace_values_compress_tag_and_payload_together() {
    block_on(async {
        let store = MockStore::new();
        let cache = Cache::builder(Clock::new_frozen()).storage(store.clone()).gzip_compression(6).build();
        let ctx = Context::new();

        let ns = cache.namespace(["group"]);
        let payload = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".repeat(8);
        ns.set(&ctx, Item::new("key", payload.clone())).await.expect("set failed");

        // The wire value is one gzip container over tag plus payload.
        let on_wire = store.value_of("cachebox:rk:key").expect("value missing");
        assert_eq!(&on_wire[..2], &[0x1f, 0x8b]);

        let out = ns.get(&ctx, "key").await.expect("get failed");
        assert_eq!(out.as_deref(), Some(payload.as_bytes()));
    });
}
