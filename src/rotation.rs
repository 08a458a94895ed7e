// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Strict cyclic turn-taking between a fixed set of participants. One shared
// index names the current holder; everyone else sleeps on a single condition
// variable and re-checks after every broadcast. Advancing the turn is a
// broadcast, not a single wake: which waiter may run next is known only
// here, so every waiter must re-check.

use std::fmt;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Result, SyncError};

/// Forces a fixed set of participants to act in a fixed cyclic order.
///
/// The order is given at construction and never changes; the first entry
/// holds the turn initially. A participant calls [`await_turn`] to block
/// until the turn reaches it, performs its action, then calls [`advance`]
/// to hand the turn to the next participant in the cycle. [`take_turn`] and
/// [`run_rounds`] bundle that sequence.
///
/// Two-way alternation (`[Odd, Even]`) and N-way rotation (`["a", "b", "c"]`)
/// are the same primitive with different orders.
///
/// [`await_turn`]: Self::await_turn
/// [`advance`]: Self::advance
/// [`take_turn`]: Self::take_turn
/// [`run_rounds`]: Self::run_rounds
pub struct RotationCoordinator<P> {
    order: Vec<P>,
    state: Mutex<State>,
    turn_ready: Condvar,
}

struct State {
    current: usize,
    cancelled: bool,
}

impl<P: PartialEq + fmt::Debug> RotationCoordinator<P> {
    /// Create a coordinator over the given cyclic order.
    ///
    /// Fewer than two participants or a repeated identity is rejected here,
    /// never at use time.
    pub fn new(order: Vec<P>) -> Result<Self> {
        if order.len() < 2 {
            return Err(SyncError::TooFewParticipants(order.len()));
        }
        for (i, id) in order.iter().enumerate() {
            if order[..i].contains(id) {
                return Err(SyncError::DuplicateParticipant(format!("{id:?}")));
            }
        }
        debug!(participants = order.len(), "rotation created");
        Ok(Self {
            order,
            state: Mutex::new(State {
                current: 0,
                cancelled: false,
            }),
            turn_ready: Condvar::new(),
        })
    }

    fn position(&self, id: &P) -> Result<usize> {
        self.order
            .iter()
            .position(|p| p == id)
            .ok_or_else(|| SyncError::UnknownParticipant(format!("{id:?}")))
    }

    /// Block until it is `id`'s turn.
    ///
    /// An identity that is not part of the order is a configuration error,
    /// reported immediately instead of blocking forever.
    pub fn await_turn(&self, id: &P) -> Result<()> {
        let slot = self.position(id)?;
        let mut state = self.state.lock()?;
        while state.current != slot {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            state = self.turn_ready.wait(state)?;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        Ok(())
    }

    /// Like [`await_turn`](Self::await_turn), but gives up after `timeout`.
    /// `Ok(false)` if the turn did not arrive in time.
    pub fn await_turn_timeout(&self, id: &P, timeout: Duration) -> Result<bool> {
        let slot = self.position(id)?;
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock()?;
        while state.current != slot {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let (guard, _timed_out) = self.turn_ready.wait_timeout(state, deadline - now)?;
            state = guard;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        Ok(true)
    }

    /// Hand the turn to the next participant in the cycle.
    ///
    /// Only the current holder may advance. Any other caller gets
    /// [`SyncError::InvalidTurn`] and the turn does not move — silently
    /// tolerating the misuse is what lets an output sequence desynchronize.
    pub fn advance(&self, id: &P) -> Result<()> {
        let slot = self.position(id)?;
        let mut state = self.state.lock()?;
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        if state.current != slot {
            let caller = format!("{id:?}");
            let holder = format!("{:?}", self.order[state.current]);
            warn!(%caller, %holder, "advance out of turn");
            return Err(SyncError::InvalidTurn { caller, holder });
        }
        state.current = (state.current + 1) % self.order.len();
        drop(state);
        self.turn_ready.notify_all();
        Ok(())
    }

    /// Wait for `id`'s turn, run `action`, hand the turn over.
    ///
    /// The coordinator's lock is not held while `action` runs; the turn
    /// stays with `id` until the closing `advance`.
    pub fn take_turn<R>(&self, id: &P, action: impl FnOnce() -> R) -> Result<R> {
        self.await_turn(id)?;
        let out = action();
        self.advance(id)?;
        Ok(out)
    }

    /// The per-participant loop: `rounds` turns, with the round index passed
    /// to `action`.
    pub fn run_rounds(
        &self,
        id: &P,
        rounds: usize,
        mut action: impl FnMut(usize),
    ) -> Result<()> {
        for round in 0..rounds {
            self.await_turn(id)?;
            action(round);
            self.advance(id)?;
        }
        Ok(())
    }

    /// Number of participants in the cycle.
    pub fn participants(&self) -> usize {
        self.order.len()
    }

    /// Release every blocked participant; all later calls fail with
    /// [`SyncError::Cancelled`].
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancelled = true;
        debug!("rotation cancelled");
        drop(state);
        self.turn_ready.notify_all();
    }
}

impl<P: PartialEq + fmt::Debug + Clone> RotationCoordinator<P> {
    /// The participant currently holding the turn. Advisory: another thread
    /// may advance as soon as the lock is dropped.
    pub fn holder(&self) -> P {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.order[state.current].clone()
    }
}
