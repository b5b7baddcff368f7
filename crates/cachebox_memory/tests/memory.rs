// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the in-memory store.

use std::time::Duration;

use cachebox_memory::InMemoryStore;
use cachebox_store::{Context, Item, Store};

#[tokio::test]
async fn mget_reply_is_positionally_aligned() {
    let store = InMemoryStore::new();
    let ctx = Context::new();

    store
        .set(&ctx, &[Item::new("a", "1"), Item::new("c", "3")])
        .await
        .expect("set failed");

    let reply = store
        .mget(&ctx, &["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .expect("mget failed");

    assert_eq!(reply.len(), 3);
    assert_eq!(reply[0].as_deref(), Some(b"1".as_slice()));
    assert!(reply[1].is_none());
    assert_eq!(reply[2].as_deref(), Some(b"3".as_slice()));
}

#[tokio::test]
async fn empty_value_is_present_not_missing() {
    let store = InMemoryStore::new();
    let ctx = Context::new();

    store.set(&ctx, &[Item::new("empty", Vec::new())]).await.expect("set failed");

    let reply = store.mget(&ctx, &["empty".to_string()]).await.expect("mget failed");
    assert_eq!(reply[0].as_deref(), Some(b"".as_slice()));
}

#[tokio::test]
async fn delete_removes_entries() {
    let store = InMemoryStore::new();
    let ctx = Context::new();

    store.set(&ctx, &[Item::new("a", "1"), Item::new("b", "2")]).await.expect("set failed");
    store.delete(&ctx, &["a".to_string()]).await.expect("delete failed");

    let reply = store.mget(&ctx, &["a".to_string(), "b".to_string()]).await.expect("mget failed");
    assert!(reply[0].is_none());
    assert_eq!(reply[1].as_deref(), Some(b"2".as_slice()));
}

#[tokio::test]
async fn zero_ttl_does_not_expire() {
    let store = InMemoryStore::new();
    let ctx = Context::new();

    store.set(&ctx, &[Item::new("key", "value")]).await.expect("set failed");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let reply = store.mget(&ctx, &["key".to_string()]).await.expect("mget failed");
    assert_eq!(reply[0].as_deref(), Some(b"value".as_slice()));
}

#[tokio::test]
async fn short_ttl_expires() {
    let store = InMemoryStore::new();
    let ctx = Context::new();

    store
        .set(&ctx, &[Item::new("key", "value").with_ttl(Duration::from_millis(10))])
        .await
        .expect("set failed");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let reply = store.mget(&ctx, &["key".to_string()]).await.expect("mget failed");
    assert!(reply[0].is_none());
}
