// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Three threads print "a", "b", "c" in strict rotation: abcabc…
// Both constructions of the same schedule are available: the shared
// turn-index coordinator, and the ring of chained permits. Their output is
// identical.
//
// Usage:
//   demo_abc [coord|chain] [rounds]

use std::io::Write;
use std::sync::Arc;
use std::thread;

use tracing::info;

use libturn::{PermitChain, RotationCoordinator};

const LETTERS: [&str; 3] = ["a", "b", "c"];

fn run_with_coordinator(rounds: usize) {
    let coord = Arc::new(RotationCoordinator::new(LETTERS.to_vec()).expect("coordinator"));

    let handles: Vec<_> = LETTERS
        .into_iter()
        .map(|letter| {
            let coord = Arc::clone(&coord);
            thread::spawn(move || {
                coord
                    .run_rounds(&letter, rounds, |_| print!("{letter}"))
                    .expect("rounds");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

fn run_with_chain(rounds: usize) {
    let chain = Arc::new(PermitChain::new(LETTERS.len()).expect("chain"));

    let handles: Vec<_> = (0..LETTERS.len())
        .map(|slot| {
            let chain = Arc::clone(&chain);
            thread::spawn(move || {
                chain
                    .run_rounds(slot, rounds, |_| print!("{}", LETTERS[slot]))
                    .expect("rounds");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let engine = args.get(1).map(String::as_str).unwrap_or("coord");
    let rounds: usize = args
        .get(2)
        .map(|s| s.parse().expect("rounds must be a number"))
        .unwrap_or(5);

    info!(engine, rounds, "starting rotation");
    match engine {
        "coord" => run_with_coordinator(rounds),
        "chain" => run_with_chain(rounds),
        _ => {
            eprintln!("usage: demo_abc [coord|chain] [rounds]");
            std::process::exit(1);
        }
    }

    println!();
    std::io::stdout().flush().expect("flush");
}
