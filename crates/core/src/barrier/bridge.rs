// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch bridge: store notifications to barrier wake-ups
//!
//! The barrier owns a one-slot wake channel. Every watch it installs is a
//! [`WatchBridge`] holding a sender for that channel plus a shared
//! [`Lifecycle`] handle. A notification only becomes a wake-up while the
//! lifecycle is [`LifecycleState::Live`]; a full slot means a wake-up is
//! already pending, so further notifications coalesce into it.

use crate::store::{WatchEvent, Watcher};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Liveness of a barrier instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Watch notifications wake the waiter
    Live,
    /// Notifications are swallowed; the wait loop relies on its backstop
    Deactivated,
    /// The member abandoned the round
    Cancelled,
}

impl LifecycleState {
    fn encode(self) -> u8 {
        match self {
            LifecycleState::Live => 0,
            LifecycleState::Deactivated => 1,
            LifecycleState::Cancelled => 2,
        }
    }

    fn decode(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Live,
            1 => LifecycleState::Deactivated,
            _ => LifecycleState::Cancelled,
        }
    }
}

/// Shared, atomically updated lifecycle state
#[derive(Clone, Debug, Default)]
pub struct Lifecycle(Arc<AtomicU8>);

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::decode(self.0.load(Ordering::Acquire))
    }

    pub fn is_live(&self) -> bool {
        self.state() == LifecycleState::Live
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == LifecycleState::Cancelled
    }

    /// `Live -> Deactivated`. Returns false if the barrier was not live.
    pub fn deactivate(&self) -> bool {
        self.0
            .compare_exchange(
                LifecycleState::Live.encode(),
                LifecycleState::Deactivated.encode(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Any state `-> Cancelled`. Returns the previous state.
    pub fn cancel(&self) -> LifecycleState {
        LifecycleState::decode(
            self.0
                .swap(LifecycleState::Cancelled.encode(), Ordering::AcqRel),
        )
    }
}

/// Forwards fired watches to the barrier's wait loop
pub struct WatchBridge {
    barrier: String,
    lifecycle: Lifecycle,
    wake: mpsc::Sender<()>,
}

impl WatchBridge {
    pub fn new(barrier: impl Into<String>, lifecycle: Lifecycle, wake: mpsc::Sender<()>) -> Self {
        Self {
            barrier: barrier.into(),
            lifecycle,
            wake,
        }
    }
}

impl Watcher for WatchBridge {
    fn process(&self, event: WatchEvent) {
        if !self.lifecycle.is_live() {
            tracing::trace!(
                barrier = %self.barrier,
                path = %event.path,
                state = ?self.lifecycle.state(),
                "watch swallowed"
            );
            return;
        }
        match self.wake.try_send(()) {
            Ok(()) => tracing::trace!(
                barrier = %self.barrier,
                path = %event.path,
                kind = ?event.kind,
                "watch fired, waking waiter"
            ),
            Err(TrySendError::Full(())) => {
                tracing::trace!(barrier = %self.barrier, "wake-up already pending")
            }
            Err(TrySendError::Closed(())) => {
                tracing::trace!(barrier = %self.barrier, "barrier dropped")
            }
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
