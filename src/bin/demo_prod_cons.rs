// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// One producer feeds 1..=total through a bounded queue; three consumers
// drain it. The queue capacity is smaller than the total, so the producer
// is repeatedly blocked by backpressure. Once the producer is done the
// queue is cancelled: consumers drain the remainder and exit.
//
// Usage:
//   demo_prod_cons [total] [capacity]

use std::sync::Arc;
use std::thread;

use tracing::info;

use libturn::{BoundedBlockingQueue, SyncError};

const CONSUMERS: usize = 3;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let total: usize = args
        .get(1)
        .map(|s| s.parse().expect("total must be a number"))
        .unwrap_or(20);
    let capacity: usize = args
        .get(2)
        .map(|s| s.parse().expect("capacity must be a number"))
        .unwrap_or(5);

    let queue = Arc::new(BoundedBlockingQueue::new(capacity).expect("queue"));
    info!(total, capacity, consumers = CONSUMERS, "starting");

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 1..=total {
                queue.put(i).expect("put");
                println!("producer: put {i}");
            }
        })
    };

    let consumers: Vec<_> = (1..=CONSUMERS)
        .map(|k| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || loop {
                match queue.take() {
                    Ok(v) => println!("consumer {k}: took {v}"),
                    Err(SyncError::Cancelled) => return,
                    Err(e) => panic!("take: {e}"),
                }
            })
        })
        .collect();

    producer.join().unwrap();
    queue.cancel();
    for c in consumers {
        c.join().unwrap();
    }
    info!("all values delivered");
}
