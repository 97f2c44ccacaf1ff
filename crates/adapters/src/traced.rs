// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use async_trait::async_trait;
use rendezvous_core::{
    CoordinationStore, CreateMode, CreateOutcome, DeleteOutcome, NodePath, StoreError,
    WatchHandle,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any CoordinationStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CoordinationStore> CoordinationStore for TracedStore<S> {
    async fn create(
        &self,
        path: &NodePath,
        mode: CreateMode,
    ) -> Result<CreateOutcome, StoreError> {
        let span = tracing::info_span!("store.create", %path, ?mode);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create(path, mode).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(CreateOutcome::Created(_)) => tracing::debug!(elapsed_ms, "created"),
                // Losing a create race is an expected outcome
                Ok(CreateOutcome::AlreadyExists) => tracing::debug!(elapsed_ms, "already exists"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_if_empty(&self, path: &NodePath) -> Result<DeleteOutcome, StoreError> {
        let span = tracing::info_span!("store.delete", %path);
        async {
            let result = self.inner.delete_if_empty(path).await;
            match &result {
                Ok(DeleteOutcome::Deleted) => tracing::debug!("deleted"),
                Ok(DeleteOutcome::NotEmpty) => tracing::debug!("not empty, kept"),
                Ok(DeleteOutcome::NotFound) => tracing::debug!("already gone"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get_children(
        &self,
        path: &NodePath,
        watch: Option<WatchHandle>,
    ) -> Result<Vec<String>, StoreError> {
        let span = tracing::info_span!("store.get_children", %path, watch = watch.is_some());
        async {
            let result = self.inner.get_children(path, watch).await;
            match &result {
                Ok(children) => tracing::trace!(count = children.len(), "listed"),
                Err(e) => tracing::error!(error = %e, "get_children failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn exists(
        &self,
        path: &NodePath,
        watch: Option<WatchHandle>,
    ) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.exists", %path, watch = watch.is_some());
        async {
            let result = self.inner.exists(path, watch).await;
            match &result {
                Ok(present) => tracing::trace!(present, "checked"),
                Err(e) => tracing::error!(error = %e, "exists failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
