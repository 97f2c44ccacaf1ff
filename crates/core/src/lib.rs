// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rendezvous-core: distributed barrier over a hierarchical coordination store
//!
//! This crate provides:
//! - The [`CoordinationStore`] interface and an in-process [`MemoryStore`]
//! - The [`Barrier`] rendezvous protocol and its watch bridge
//! - Member identity and barrier configuration

pub mod barrier;
pub mod id;
pub mod store;

// Re-exports
pub use barrier::{
    Barrier, BarrierConfig, BarrierPhase, ConfigError, CoordinationFailure, LifecycleState,
    Role, ALL_CLEAR,
};
pub use id::{IdGen, MemberId, SequentialIdGen, UuidIdGen};
pub use store::{
    CoordinationStore, CreateMode, CreateOutcome, DeleteOutcome, MemoryStore, NodePath,
    StoreError, WatchEvent, WatchEventKind, WatchHandle, Watcher,
};
