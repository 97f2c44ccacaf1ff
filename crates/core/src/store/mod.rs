// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination store interface
//!
//! The barrier talks to the outside world only through [`CoordinationStore`]:
//! a hierarchical namespace with atomic create-if-absent, delete-if-empty, and
//! one-shot watches on children and existence. Watches are delivered to a
//! [`Watcher`] whenever the store sees fit; callers must never assume delivery.

pub mod memory;
pub mod path;

pub use memory::{MemoryStore, SessionId, StoreCall};
pub use path::NodePath;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Lifetime of a created node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// Survives the creating session
    Persistent,
    /// Removed when the creating session ends
    Ephemeral,
}

/// Result of a create-if-absent call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    /// This call created the node
    Created(NodePath),
    /// The node was already present; nothing was created
    AlreadyExists,
}

impl CreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Result of a delete-if-empty call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The node has children and was left in place
    NotEmpty,
    NotFound,
}

/// What changed to trigger a watch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchEventKind {
    NodeCreated,
    NodeDeleted,
    ChildrenChanged,
}

/// A fired watch notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: NodePath,
}

/// Receiver of fired watch notifications.
///
/// Called from whatever context the store delivers events on. Implementations
/// must not block.
pub trait Watcher: Send + Sync {
    fn process(&self, event: WatchEvent);
}

/// Shared handle to a registered watcher
pub type WatchHandle = Arc<dyn Watcher>;

/// Errors from coordination store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("connection to coordination store lost")]
    ConnectionLoss,
    #[error("coordination session expired")]
    SessionExpired,
    #[error("node not found: {0}")]
    NoNode(NodePath),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Client for a hierarchical coordination store
#[async_trait]
pub trait CoordinationStore: Clone + Send + Sync + 'static {
    /// Atomically create `path` unless it already exists.
    ///
    /// The parent must exist. An existing node is reported as
    /// [`CreateOutcome::AlreadyExists`], never as an error.
    async fn create(&self, path: &NodePath, mode: CreateMode)
        -> Result<CreateOutcome, StoreError>;

    /// Atomically delete `path` if it has no children
    async fn delete_if_empty(&self, path: &NodePath) -> Result<DeleteOutcome, StoreError>;

    /// List the child names of `path`, optionally leaving a one-shot watch
    /// that fires when the child set changes or the node is deleted
    async fn get_children(
        &self,
        path: &NodePath,
        watch: Option<WatchHandle>,
    ) -> Result<Vec<String>, StoreError>;

    /// Check whether `path` exists, optionally leaving a one-shot watch that
    /// fires when it is created or deleted
    async fn exists(&self, path: &NodePath, watch: Option<WatchHandle>)
        -> Result<bool, StoreError>;
}
