// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier failure type

use crate::store::StoreError;
use thiserror::Error;

/// Why a call to [`Barrier::enter`](super::Barrier::enter) did not complete.
///
/// Store-level faults are never retried internally: a lost session takes this
/// member's ephemeral entries with it, so the caller must treat the round as
/// failed.
#[derive(Debug, Error)]
pub enum CoordinationFailure {
    #[error("barrier {barrier:?}: coordination store failure: {source}")]
    Communication {
        barrier: String,
        #[source]
        source: StoreError,
    },
    #[error("barrier {barrier:?}: wait interrupted")]
    Interrupted { barrier: String },
    #[error("barrier {barrier:?} already completed")]
    AlreadyCompleted { barrier: String },
}

impl CoordinationFailure {
    pub fn barrier(&self) -> &str {
        match self {
            CoordinationFailure::Communication { barrier, .. }
            | CoordinationFailure::Interrupted { barrier }
            | CoordinationFailure::AlreadyCompleted { barrier } => barrier,
        }
    }

    /// The underlying store error, for communication failures
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CoordinationFailure::Communication { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, CoordinationFailure::Interrupted { .. })
    }
}
