// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Tests for the counting semaphore and the chained-permit rotation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use libturn::{PermitChain, RotationCoordinator, Semaphore, SyncError};

#[test]
fn semaphore_counts_permits() {
    let sem = Semaphore::new(2);
    assert_eq!(sem.permits(), 2);
    sem.acquire().expect("first");
    sem.acquire().expect("second");
    assert_eq!(sem.permits(), 0);
    assert!(!sem.try_acquire().expect("exhausted"));
    sem.release().expect("release");
    assert!(sem.try_acquire().expect("replenished"));
}

#[test]
fn acquire_blocks_until_release() {
    let sem = Arc::new(Semaphore::new(0));
    let passed = Arc::new(AtomicUsize::new(0));

    let s2 = Arc::clone(&sem);
    let p2 = Arc::clone(&passed);
    let t = thread::spawn(move || {
        s2.acquire().expect("acquire");
        p2.fetch_add(1, Ordering::SeqCst);
    });

    thread::sleep(Duration::from_millis(100));
    assert_eq!(passed.load(Ordering::SeqCst), 0, "must still be blocked");
    sem.release().expect("release");
    t.join().unwrap();
    assert_eq!(passed.load(Ordering::SeqCst), 1);
    assert_eq!(sem.permits(), 0);
}

#[test]
fn acquire_timeout_expires() {
    let sem = Semaphore::new(0);
    assert!(!sem
        .acquire_timeout(Duration::from_millis(80))
        .expect("timed acquire"));
    let sem2 = Semaphore::new(1);
    assert!(sem2
        .acquire_timeout(Duration::from_millis(0))
        .expect("instant acquire"));
}

#[test]
fn semaphore_cancel_releases_waiters() {
    let sem = Arc::new(Semaphore::new(0));
    let s2 = Arc::clone(&sem);
    let t = thread::spawn(move || s2.acquire());
    thread::sleep(Duration::from_millis(100));
    sem.cancel();
    assert_eq!(t.join().unwrap(), Err(SyncError::Cancelled));
}

#[test]
fn chain_rejects_short_ring() {
    assert!(matches!(
        PermitChain::new(1),
        Err(SyncError::TooFewParticipants(1))
    ));
}

#[test]
fn chain_rejects_out_of_range_slot() {
    let chain = PermitChain::new(2).expect("new");
    assert!(matches!(
        chain.await_slot(5),
        Err(SyncError::UnknownParticipant(_))
    ));
    assert!(matches!(
        chain.pass(5),
        Err(SyncError::UnknownParticipant(_))
    ));
}

#[test]
fn chain_three_slot_rotation() {
    const ROUNDS: usize = 5;
    let chain = Arc::new(PermitChain::new(3).expect("new"));
    let out = Arc::new(Mutex::new(String::new()));
    let letters = ["a", "b", "c"];

    let handles: Vec<_> = (0..3)
        .map(|slot| {
            let chain = Arc::clone(&chain);
            let out = Arc::clone(&out);
            thread::spawn(move || {
                chain
                    .run_rounds(slot, ROUNDS, |_| out.lock().unwrap().push_str(letters[slot]))
                    .expect("rounds");
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(*out.lock().unwrap(), "abcabcabcabcabc");
}

#[test]
fn chain_cancel_releases_blocked_slot() {
    let chain = Arc::new(PermitChain::new(2).expect("new"));
    let c2 = Arc::clone(&chain);
    let t = thread::spawn(move || c2.await_slot(1));
    thread::sleep(Duration::from_millis(100));
    chain.cancel();
    assert_eq!(t.join().unwrap(), Err(SyncError::Cancelled));
}

// The chained-permit ring and the turn-index coordinator must produce the
// same schedule for the same participant count and round count.
#[test]
fn chain_and_coordinator_produce_identical_schedules() {
    const N: usize = 4;
    const ROUNDS: usize = 10;

    let via_chain = {
        let chain = Arc::new(PermitChain::new(N).expect("chain"));
        let log = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..N)
            .map(|slot| {
                let chain = Arc::clone(&chain);
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    chain
                        .run_rounds(slot, ROUNDS, |_| log.lock().unwrap().push(slot))
                        .expect("rounds");
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        Arc::try_unwrap(log).unwrap().into_inner().unwrap()
    };

    let via_coordinator = {
        let coord = Arc::new(RotationCoordinator::new((0..N).collect::<Vec<_>>()).expect("coord"));
        let log = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..N)
            .map(|id| {
                let coord = Arc::clone(&coord);
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    coord
                        .run_rounds(&id, ROUNDS, |_| log.lock().unwrap().push(id))
                        .expect("rounds");
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        Arc::try_unwrap(log).unwrap().into_inner().unwrap()
    };

    assert_eq!(via_chain, via_coordinator);
}
