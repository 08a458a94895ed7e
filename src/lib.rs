// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Turn-based thread coordination primitives.
// Two independent building blocks: a capacity-bounded blocking queue for
// producer/consumer handoff with backpressure, and a strict-rotation
// coordinator that forces a fixed set of participants to act in cyclic
// order. A chained-permit ring provides the same rotation schedule built
// from counting semaphores. All waits sleep on condition variables and can
// be cancelled while blocked.

mod error;
pub use error::{Result, SyncError};

mod queue;
pub use queue::BoundedBlockingQueue;

mod rotation;
pub use rotation::RotationCoordinator;

mod permits;
pub use permits::{PermitChain, Semaphore};
