// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Single-flight stampede prevention with the key lock.
//!
//! Run with: `cargo run --example stampede`

use std::time::Duration;

use cachebox::{Cache, Context, Item};
use cachebox_memory::InMemoryStore;
use tick::Clock;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), cachebox::Error> {
    let cache = Cache::builder(Clock::new_frozen()).storage(InMemoryStore::new()).key_lock().build();

    // The first miss designates this caller as the recomputer.
    let first = cache.get(&Context::new(), "hot").await?;
    println!("designated recomputer sees: {first:?}");

    // Concurrent readers of the same key park instead of recomputing.
    let mut waiters = Vec::new();
    for i in 0..4 {
        let cache = cache.clone();
        waiters.push(tokio::spawn(async move {
            let value = cache.get(&Context::new(), "hot").await;
            println!("waiter {i} received: {value:?}");
        }));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The recomputed value releases every waiter at once.
    cache.set(&Context::new(), Item::new("hot", "expensive result")).await?;

    for waiter in waiters {
        let _ = waiter.await;
    }

    Ok(())
}
