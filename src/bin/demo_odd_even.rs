// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Two threads print the naturals in strict alternation: the odd thread
// prints 2i+1, the even thread prints 2i+2, for max_limit rounds each.
// With the default max_limit of 5 the output is 1 through 10, one per line.
//
// Usage:
//   demo_odd_even [max_limit]

use std::sync::Arc;
use std::thread;

use tracing::info;

use libturn::RotationCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumKind {
    Odd,
    Even,
}

fn main() {
    tracing_subscriber::fmt::init();

    let max_limit: usize = std::env::args()
        .nth(1)
        .map(|s| s.parse().expect("max_limit must be a number"))
        .unwrap_or(5);

    let coord = Arc::new(
        RotationCoordinator::new(vec![NumKind::Odd, NumKind::Even]).expect("coordinator"),
    );
    info!(max_limit, "printing {} numbers", 2 * max_limit);

    let odd = {
        let coord = Arc::clone(&coord);
        thread::spawn(move || {
            coord
                .run_rounds(&NumKind::Odd, max_limit, |i| println!("{}", 2 * i + 1))
                .expect("odd rounds");
        })
    };
    let even = {
        let coord = Arc::clone(&coord);
        thread::spawn(move || {
            coord
                .run_rounds(&NumKind::Even, max_limit, |i| println!("{}", 2 * i + 2))
                .expect("even rounds");
        })
    };

    odd.join().unwrap();
    even.join().unwrap();
}
