// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Group invalidation with namespace keys.
//!
//! Run with: `cargo run --example namespace`

use std::time::Duration;

use cachebox::{Cache, Context, Item};
use cachebox_memory::InMemoryStore;
use tick::ClockControl;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), cachebox::Error> {
    let control = ClockControl::new_at(std::time::SystemTime::now());
    let cache = Cache::builder(control.to_clock()).storage(InMemoryStore::new()).build();
    let ctx = Context::new();

    // Bind the timeline to two namespaces; invalidating either one kills it.
    let ns = cache.namespace(["posts", "user:42"]);
    ns.set(&ctx, Item::new("timeline", "rendered timeline").with_ttl(Duration::from_secs(60)))
        .await?;

    let hit = ns.get(&ctx, "timeline").await?;
    println!("before invalidation: {hit:?}");

    // Invalidate every key bound to "posts" without enumerating them.
    cache.delete(&ctx, "posts").await?;
    control.advance(Duration::from_nanos(1));

    let fresh = cache.namespace(["posts", "user:42"]);
    let miss = fresh.get(&ctx, "timeline").await?;
    println!("after invalidation:  {miss:?}");

    Ok(())
}
