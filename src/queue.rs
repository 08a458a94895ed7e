// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Capacity-bounded FIFO for handing values between producer and consumer
// threads. One mutex guards the buffer; two condition variables carry the
// not-full and not-empty wakeups. Producers block while the buffer is full,
// consumers block while it is empty. No busy-waiting anywhere.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, SyncError};

/// A thread-safe FIFO with a fixed capacity.
///
/// Any number of producers and consumers may share one queue via `Arc`.
/// Values from a single producer are delivered in the order they were put;
/// no value is lost or duplicated under any interleaving. The buffer never
/// holds more than `capacity` values.
///
/// Every wait re-checks its predicate in a loop: a condition-variable wakeup
/// only means "look again", not "proceed".
pub struct BoundedBlockingQueue<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

struct State<T> {
    buf: VecDeque<T>,
    cancelled: bool,
}

impl<T> BoundedBlockingQueue<T> {
    /// Create a queue holding at most `capacity` values.
    ///
    /// A capacity of zero is rejected here, never at use time.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SyncError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(capacity),
                cancelled: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Append `value` at the tail, blocking while the buffer is full.
    pub fn put(&self, value: T) -> Result<()> {
        let mut state = self.state.lock()?;
        while state.buf.len() == self.capacity {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            state = self.not_full.wait(state)?;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        state.buf.push_back(value);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Like [`put`](Self::put), but gives up after `timeout`.
    ///
    /// Returns `Ok(None)` once the value is accepted. On expiry the value is
    /// handed back as `Ok(Some(value))` — it never entered the buffer.
    pub fn put_timeout(&self, value: T, timeout: Duration) -> Result<Option<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock()?;
        while state.buf.len() == self.capacity {
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(Some(value));
            }
            let (guard, _timed_out) = self.not_full.wait_timeout(state, deadline - now)?;
            state = guard;
        }
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        state.buf.push_back(value);
        self.not_empty.notify_one();
        Ok(None)
    }

    /// Append `value` only if there is room right now.
    ///
    /// Returns `Ok(Some(value))` — handing the value back — if the buffer
    /// is full.
    pub fn try_put(&self, value: T) -> Result<Option<T>> {
        let mut state = self.state.lock()?;
        if state.cancelled {
            return Err(SyncError::Cancelled);
        }
        if state.buf.len() == self.capacity {
            return Ok(Some(value));
        }
        state.buf.push_back(value);
        self.not_empty.notify_one();
        Ok(None)
    }

    /// Remove and return the head value, blocking while the buffer is empty.
    ///
    /// Strict FIFO: the value resident longest comes out first.
    pub fn take(&self) -> Result<T> {
        let mut state = self.state.lock()?;
        loop {
            if let Some(value) = state.buf.pop_front() {
                self.not_full.notify_one();
                return Ok(value);
            }
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            state = self.not_empty.wait(state)?;
        }
    }

    /// Like [`take`](Self::take), but gives up after `timeout`.
    /// `Ok(None)` on expiry.
    pub fn take_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock()?;
        loop {
            if let Some(value) = state.buf.pop_front() {
                self.not_full.notify_one();
                return Ok(Some(value));
            }
            if state.cancelled {
                return Err(SyncError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let (guard, _timed_out) = self.not_empty.wait_timeout(state, deadline - now)?;
            state = guard;
        }
    }

    /// Remove the head value only if one is buffered right now.
    pub fn try_take(&self) -> Result<Option<T>> {
        let mut state = self.state.lock()?;
        match state.buf.pop_front() {
            Some(value) => {
                self.not_full.notify_one();
                Ok(Some(value))
            }
            None if state.cancelled => Err(SyncError::Cancelled),
            None => Ok(None),
        }
    }

    /// Instantaneous number of buffered values.
    ///
    /// Advisory: the answer can be stale as soon as the lock is dropped.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buf
            .len()
    }

    /// Whether the buffer is empty right now. Advisory, like [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity given at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release every blocked producer and consumer.
    ///
    /// Subsequent `put`s fail with [`SyncError::Cancelled`]. `take` keeps
    /// draining values that were already buffered and fails only once the
    /// buffer is empty, so no accepted value is dropped.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancelled = true;
        debug!(
            capacity = self.capacity,
            buffered = state.buf.len(),
            "queue cancelled"
        );
        drop(state);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancelled
    }
}
