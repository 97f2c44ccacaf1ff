// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed rendezvous barrier
//!
//! This module provides:
//! - **Barrier** - Per-member protocol: root race, registration, wait, cleanup
//! - **WatchBridge** - Turns store watch notifications into wake-ups
//! - **BarrierConfig** - Barrier name, expected member count, backstop interval
//!
//! Namespace layout for a barrier named `round1`:
//!
//! ```text
//! /round1             persistent, created by the initiator
//! /round1/<member>    ephemeral, one per member, removed on the way out
//! /round1/AllClear    ephemeral, created by the initiator once all arrived
//! ```

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod nodes;
pub mod phase;

pub use bridge::{Lifecycle, LifecycleState, WatchBridge};
pub use config::{BarrierConfig, ConfigError};
pub use coordinator::Barrier;
pub use error::CoordinationFailure;
pub use phase::{BarrierPhase, Role};

/// Name of the all-clear marker beneath a barrier root
pub const ALL_CLEAR: &str = "AllClear";
