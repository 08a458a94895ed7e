// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Counting semaphore plus the chained-permit rotation built from it: one
// binary permit per slot, pre-granted to slot 0. Granting a slot's permit
// is the only way to unblock it, so the ring runs in strict
// 0, 1, …, n-1, 0, … order — the same observable schedule as a
// RotationCoordinator over n participants.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, SyncError};

/// A counting semaphore on a mutex and one condition variable.
///
/// Zero initial permits is valid: the first `acquire` blocks until some
/// other thread releases. Which of several blocked acquirers wins a freed
/// permit is unspecified.
pub struct Semaphore {
    state: Mutex<State>,
    available: Condvar,
}

struct State {
    permits: usize,
    cancelled: bool,
}

impl Semaphore {
    /// Create a semaphore holding `permits` initial permits.
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(State {
                permits,
                cancelled: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Take one permit, blocking until one is available.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.state.lock()?;
        while state.permits == 0 {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            state = self.available.wait(state)?;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        state.permits -= 1;
        Ok(())
    }

    /// Like [`acquire`](Self::acquire), but gives up after `timeout`.
    /// `Ok(false)` on expiry.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock()?;
        while state.permits == 0 {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let (guard, _timed_out) = self.available.wait_timeout(state, deadline - now)?;
            state = guard;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        state.permits -= 1;
        Ok(true)
    }

    /// Take one permit only if one is available right now.
    pub fn try_acquire(&self) -> Result<bool> {
        let mut state = self.state.lock()?;
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        if state.permits == 0 {
            return Ok(false);
        }
        state.permits -= 1;
        Ok(true)
    }

    /// Put one permit back and wake one waiter.
    pub fn release(&self) -> Result<()> {
        let mut state = self.state.lock()?;
        state.permits += 1;
        drop(state);
        self.available.notify_one();
        Ok(())
    }

    /// Available permits right now. Advisory.
    pub fn permits(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .permits
    }

    /// Release every blocked acquirer; later acquires fail with
    /// [`SyncError::Cancelled`].
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancelled = true;
        debug!(permits = state.permits, "semaphore cancelled");
        drop(state);
        self.available.notify_all();
    }
}

/// The chained-permit rotation: `n` binary permits in a ring, slot 0
/// pre-granted.
///
/// Each participant owns one slot index for the ring's lifetime. A slot
/// blocks in [`await_slot`] until its permit is granted and hands over with
/// [`pass`], which grants the next slot in the ring. Misuse is structural
/// rather than checked: passing from a slot that was never awaited grants a
/// permit out of order, which the coordinator in [`rotation`](crate::rotation)
/// detects instead.
///
/// [`await_slot`]: Self::await_slot
/// [`pass`]: Self::pass
pub struct PermitChain {
    links: Vec<Semaphore>,
}

impl PermitChain {
    /// Build a ring of `n` slots; slot 0 holds the initial permit.
    pub fn new(n: usize) -> Result<Self> {
        if n < 2 {
            return Err(SyncError::TooFewParticipants(n));
        }
        let links = (0..n)
            .map(|i| Semaphore::new(if i == 0 { 1 } else { 0 }))
            .collect();
        Ok(Self { links })
    }

    fn link(&self, slot: usize) -> Result<&Semaphore> {
        self.links
            .get(slot)
            .ok_or_else(|| SyncError::UnknownParticipant(slot.to_string()))
    }

    /// Block until slot `slot`'s permit is granted.
    pub fn await_slot(&self, slot: usize) -> Result<()> {
        self.link(slot)?.acquire()
    }

    /// Grant the permit of the slot after `slot` in the ring.
    pub fn pass(&self, slot: usize) -> Result<()> {
        self.link(slot)?;
        let next = (slot + 1) % self.links.len();
        self.links[next].release()
    }

    /// Wait for `slot`, run `action`, pass the permit on.
    pub fn take_turn<R>(&self, slot: usize, action: impl FnOnce() -> R) -> Result<R> {
        self.await_slot(slot)?;
        let out = action();
        self.pass(slot)?;
        Ok(out)
    }

    /// The per-participant loop on the ring: `rounds` turns, with the round
    /// index passed to `action`.
    pub fn run_rounds(
        &self,
        slot: usize,
        rounds: usize,
        mut action: impl FnMut(usize),
    ) -> Result<()> {
        for round in 0..rounds {
            self.await_slot(slot)?;
            action(round);
            self.pass(slot)?;
        }
        Ok(())
    }

    /// Number of slots in the ring.
    pub fn slots(&self) -> usize {
        self.links.len()
    }

    /// Release every blocked slot; later calls fail with
    /// [`SyncError::Cancelled`].
    pub fn cancel(&self) {
        for link in &self.links {
            link.cancel();
        }
    }
}
