// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node lifecycle helpers
//!
//! "Already exists" on create and "not empty"/"not found" on delete are
//! expected outcomes of racing members, so they are logged at debug and
//! returned as values.

use crate::store::{
    CoordinationStore, CreateMode, CreateOutcome, DeleteOutcome, NodePath, StoreError,
};

/// Create `path` unless it already exists
pub async fn create_if_absent<S: CoordinationStore>(
    store: &S,
    path: &NodePath,
    mode: CreateMode,
) -> Result<CreateOutcome, StoreError> {
    let outcome = store.create(path, mode).await?;
    match &outcome {
        CreateOutcome::Created(_) => tracing::debug!(%path, ?mode, "created node"),
        CreateOutcome::AlreadyExists => tracing::debug!(%path, "node already exists"),
    }
    Ok(outcome)
}

/// Delete `path` only if nothing is nested beneath it
pub async fn delete_if_empty<S: CoordinationStore>(
    store: &S,
    path: &NodePath,
) -> Result<DeleteOutcome, StoreError> {
    let outcome = store.delete_if_empty(path).await?;
    match outcome {
        DeleteOutcome::Deleted => tracing::debug!(%path, "deleted node"),
        DeleteOutcome::NotEmpty => tracing::debug!(%path, "node has children, left in place"),
        DeleteOutcome::NotFound => tracing::debug!(%path, "node already gone"),
    }
    Ok(outcome)
}
