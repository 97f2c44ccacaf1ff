// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-member protocol phases and roles

use serde::Serialize;
use std::fmt;

/// Role assigned by the outcome of the root-creation race
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Created the root entry; counts members and publishes the all-clear marker
    Initiator,
    /// Found the root already present; waits for the all-clear marker
    Follower,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Follower => f.write_str("follower"),
        }
    }
}

/// Where one member is within a barrier round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierPhase {
    Init,
    RootRace,
    InitiatorWaiting,
    AllClearPublished,
    FollowerWaiting,
    AllClearObserved,
    SelfCleanup,
    Done,
    /// The last `enter()` failed; the member may enter again
    Failed,
}

impl BarrierPhase {
    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_advance_to(self, next: BarrierPhase) -> bool {
        use BarrierPhase::*;
        match (self, next) {
            (Done, _) => false,
            (_, Failed) => true,
            (Init | Failed, RootRace) => true,
            (RootRace, InitiatorWaiting | FollowerWaiting) => true,
            (InitiatorWaiting, AllClearPublished) => true,
            (FollowerWaiting, AllClearObserved) => true,
            (AllClearPublished | AllClearObserved, SelfCleanup) => true,
            (SelfCleanup, Done) => true,
            _ => false,
        }
    }

    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            BarrierPhase::InitiatorWaiting | BarrierPhase::FollowerWaiting
        )
    }
}

impl fmt::Display for BarrierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarrierPhase::Init => "init",
            BarrierPhase::RootRace => "root_race",
            BarrierPhase::InitiatorWaiting => "initiator_waiting",
            BarrierPhase::AllClearPublished => "all_clear_published",
            BarrierPhase::FollowerWaiting => "follower_waiting",
            BarrierPhase::AllClearObserved => "all_clear_observed",
            BarrierPhase::SelfCleanup => "self_cleanup",
            BarrierPhase::Done => "done",
            BarrierPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
