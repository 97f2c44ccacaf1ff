// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier coordinator
//!
//! Entering a barrier races every other member to create the root entry. The
//! winner becomes the initiator: it waits for the expected number of member
//! entries and then publishes the all-clear marker. Everyone else is a
//! follower and waits for that marker to appear.
//!
//! Both wait loops block on the wake channel fed by [`WatchBridge`] *or* the
//! configured poll interval, whichever comes first, and then re-read the
//! store. A wake-up is only a hint; the store is the source of truth.

use super::bridge::{Lifecycle, LifecycleState, WatchBridge};
use super::config::{validate_member, BarrierConfig, ConfigError};
use super::error::CoordinationFailure;
use super::nodes;
use super::phase::{BarrierPhase, Role};
use super::ALL_CLEAR;
use crate::id::{IdGen, MemberId};
use crate::store::{CoordinationStore, CreateMode, NodePath, StoreError, WatchHandle};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;

#[derive(Clone, Copy, Debug)]
struct Progress {
    phase: BarrierPhase,
    role: Option<Role>,
}

/// One member's handle on a named barrier round
pub struct Barrier<S> {
    store: S,
    config: BarrierConfig,
    member: MemberId,
    root: NodePath,
    member_path: NodePath,
    all_clear: NodePath,
    lifecycle: Lifecycle,
    wake_tx: mpsc::Sender<()>,
    /// Held for the whole of `enter()`, which serializes concurrent calls
    wake_rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
    progress: Mutex<Progress>,
}

impl<S: CoordinationStore> Barrier<S> {
    pub fn new(store: S, config: BarrierConfig, member: MemberId) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_member(&member)?;

        let invalid_name = |e: StoreError| ConfigError::InvalidName {
            name: config.name.clone(),
            reason: e.to_string(),
        };
        let root = NodePath::root().child(&config.name).map_err(invalid_name)?;
        let all_clear = root.child(ALL_CLEAR).map_err(invalid_name)?;
        let member_path = root
            .child(member.as_str())
            .map_err(|e| ConfigError::InvalidMember {
                member: member.0.clone(),
                reason: e.to_string(),
            })?;

        let (wake_tx, wake_rx) = mpsc::channel(1);
        Ok(Self {
            store,
            config,
            member,
            root,
            member_path,
            all_clear,
            lifecycle: Lifecycle::new(),
            wake_tx,
            wake_rx: tokio::sync::Mutex::new(wake_rx),
            progress: Mutex::new(Progress {
                phase: BarrierPhase::Init,
                role: None,
            }),
        })
    }

    /// Build a barrier for a freshly generated member id
    pub fn with_generated_id(
        store: S,
        config: BarrierConfig,
        id_gen: &impl IdGen,
    ) -> Result<Self, ConfigError> {
        Self::new(store, config, id_gen.next())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn member(&self) -> &MemberId {
        &self.member
    }

    pub fn config(&self) -> &BarrierConfig {
        &self.config
    }

    pub fn root_path(&self) -> &NodePath {
        &self.root
    }

    pub fn member_path(&self) -> &NodePath {
        &self.member_path
    }

    pub fn all_clear_path(&self) -> &NodePath {
        &self.all_clear
    }

    pub fn phase(&self) -> BarrierPhase {
        self.progress().phase
    }

    /// Role won in the root-creation race, once resolved
    pub fn role(&self) -> Option<Role> {
        self.progress().role
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Block until every expected member has arrived.
    ///
    /// Dropping the returned future leaves the member entry in place; a later
    /// call resumes the round with the role already won.
    ///
    /// Returns once this member has either published the all-clear marker
    /// (initiator) or observed it (follower), and has removed its own member
    /// entry unless something was nested beneath it.
    pub async fn enter(&self) -> Result<(), CoordinationFailure> {
        let mut wake = self.wake_rx.lock().await;

        if self.phase() == BarrierPhase::Done {
            return Err(CoordinationFailure::AlreadyCompleted {
                barrier: self.config.name.clone(),
            });
        }
        if self.lifecycle.is_cancelled() {
            return Err(self.interrupted());
        }
        // An earlier enter() future was dropped mid-round
        let phase = self.phase();
        if !matches!(phase, BarrierPhase::Init | BarrierPhase::Failed) {
            tracing::debug!(
                barrier = %self.config.name,
                member = %self.member,
                %phase,
                "resuming abandoned attempt"
            );
            self.advance(BarrierPhase::Failed);
        }
        // Stale wake-ups from an earlier attempt
        while wake.try_recv().is_ok() {}

        let span = tracing::info_span!(
            "barrier.enter",
            barrier = %self.config.name,
            member = %self.member,
        );
        async {
            let started = Instant::now();
            match self.run(&mut wake).await {
                Ok(role) => {
                    self.advance(BarrierPhase::Done);
                    tracing::info!(
                        %role,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "passed barrier"
                    );
                    Ok(())
                }
                Err(err) => {
                    self.advance(BarrierPhase::Failed);
                    if err.is_interrupted() {
                        tracing::warn!("barrier wait cancelled");
                    } else {
                        tracing::error!(error = %err, "barrier failed");
                    }
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Stop reacting to watch notifications.
    ///
    /// A pending `enter()` is not unblocked; it keeps re-polling on the
    /// backstop interval and still exits only through its normal success
    /// condition.
    pub fn make_inactive(&self) {
        if self.lifecycle.deactivate() {
            tracing::debug!(
                barrier = %self.config.name,
                member = %self.member,
                "barrier deactivated"
            );
        }
    }

    /// Abandon the round.
    ///
    /// Deletes this member's own entry (if empty) and makes a pending
    /// `enter()` fail with [`CoordinationFailure::Interrupted`] on its next
    /// wake-up. The root entry, the all-clear marker and other members'
    /// entries are left alone. A cancellation that races with a round that
    /// completes without waiting may lose; `enter()` then returns `Ok`.
    pub async fn cancel(&self) -> Result<(), CoordinationFailure> {
        if self.lifecycle.cancel() != LifecycleState::Cancelled {
            tracing::warn!(
                barrier = %self.config.name,
                member = %self.member,
                "cancelling barrier"
            );
        }
        // Full means a wake-up is already pending, which is just as good
        let _ = self.wake_tx.try_send(());
        nodes::delete_if_empty(&self.store, &self.member_path)
            .await
            .map_err(|e| self.communication(e))?;
        Ok(())
    }

    async fn run(&self, wake: &mut mpsc::Receiver<()>) -> Result<Role, CoordinationFailure> {
        self.advance(BarrierPhase::RootRace);

        // A retry keeps the role it already won; re-racing would turn a
        // failed initiator into a follower waiting for a marker nobody publishes.
        let role = match self.role() {
            Some(role) => role,
            None => {
                let outcome =
                    nodes::create_if_absent(&self.store, &self.root, CreateMode::Persistent)
                        .await
                        .map_err(|e| self.communication(e))?;
                let role = if outcome.is_created() {
                    Role::Initiator
                } else {
                    Role::Follower
                };
                self.progress_mut(|p| p.role = Some(role));
                tracing::info!(%role, "root race resolved");
                role
            }
        };

        nodes::create_if_absent(&self.store, &self.member_path, CreateMode::Ephemeral)
            .await
            .map_err(|e| self.communication(e))?;

        match role {
            Role::Initiator => {
                self.advance(BarrierPhase::InitiatorWaiting);
                self.await_members(wake).await?;
                self.advance(BarrierPhase::AllClearPublished);
            }
            Role::Follower => {
                self.advance(BarrierPhase::FollowerWaiting);
                self.await_all_clear(wake).await?;
                self.advance(BarrierPhase::AllClearObserved);
            }
        }

        self.advance(BarrierPhase::SelfCleanup);
        nodes::delete_if_empty(&self.store, &self.member_path)
            .await
            .map_err(|e| self.communication(e))?;
        Ok(role)
    }

    async fn await_members(
        &self,
        wake: &mut mpsc::Receiver<()>,
    ) -> Result<(), CoordinationFailure> {
        let watch = self.watch();
        let expected = self.config.expected_members;
        loop {
            // Publication below must follow a fresh read, never a cached count
            let present = self
                .store
                .get_children(&self.root, Some(watch.clone()))
                .await
                .map_err(|e| self.communication(e))?
                .len();
            if present >= expected {
                tracing::debug!(present, expected, "all members arrived");
                break;
            }
            tracing::debug!(present, expected, "waiting for members");
            self.wait(wake).await?;
        }

        nodes::create_if_absent(&self.store, &self.all_clear, CreateMode::Ephemeral)
            .await
            .map_err(|e| self.communication(e))?;
        tracing::info!(path = %self.all_clear, "all-clear published");
        Ok(())
    }

    async fn await_all_clear(
        &self,
        wake: &mut mpsc::Receiver<()>,
    ) -> Result<(), CoordinationFailure> {
        let watch = self.watch();
        loop {
            let present = self
                .store
                .exists(&self.all_clear, Some(watch.clone()))
                .await
                .map_err(|e| self.communication(e))?;
            if present {
                tracing::debug!(path = %self.all_clear, "all-clear observed");
                return Ok(());
            }
            tracing::debug!("waiting for all-clear");
            self.wait(wake).await?;
        }
    }

    /// Sleep until a watch wake-up or the backstop interval, whichever is first
    async fn wait(&self, wake: &mut mpsc::Receiver<()>) -> Result<(), CoordinationFailure> {
        tokio::select! {
            _ = wake.recv() => tracing::trace!("woken"),
            _ = tokio::time::sleep(self.config.poll_interval) => tracing::trace!("backstop poll"),
        }

        if self.lifecycle.is_cancelled() {
            if let Err(e) = nodes::delete_if_empty(&self.store, &self.member_path).await {
                tracing::warn!(error = %e, "failed to remove member entry after cancel");
            }
            return Err(self.interrupted());
        }
        Ok(())
    }

    fn watch(&self) -> WatchHandle {
        Arc::new(WatchBridge::new(
            self.config.name.clone(),
            self.lifecycle.clone(),
            self.wake_tx.clone(),
        ))
    }

    fn communication(&self, source: StoreError) -> CoordinationFailure {
        CoordinationFailure::Communication {
            barrier: self.config.name.clone(),
            source,
        }
    }

    fn interrupted(&self) -> CoordinationFailure {
        CoordinationFailure::Interrupted {
            barrier: self.config.name.clone(),
        }
    }

    fn progress(&self) -> Progress {
        *self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn progress_mut(&self, f: impl FnOnce(&mut Progress)) {
        let mut progress = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut progress);
    }

    fn advance(&self, next: BarrierPhase) {
        self.progress_mut(|p| {
            debug_assert!(
                p.phase.can_advance_to(next),
                "illegal barrier transition {} -> {}",
                p.phase,
                next
            );
            tracing::debug!(from = %p.phase, to = %next, "phase");
            p.phase = next;
        });
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
