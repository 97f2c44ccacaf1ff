// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rvz run` - Run one barrier round with simulated members
//!
//! Every member gets its own session on a shared [`MemoryStore`], so member
//! entries and the all-clear marker behave as they would across processes.
//! Late members enter after the round has completed and should pass
//! straight through.

use super::BarrierArgs;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use rendezvous_adapters::TracedStore;
use rendezvous_core::store::SessionId;
use rendezvous_core::{
    Barrier, BarrierConfig, CoordinationStore, IdGen, MemoryStore, Role, SequentialIdGen,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub barrier: BarrierArgs,

    /// Members that enter after the round has completed
    #[arg(long, default_value_t = 0)]
    pub late: usize,

    /// Delay between member arrivals (e.g. "50ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub stagger: Option<Duration>,

    /// Discard every watch notification, leaving only backstop polling
    #[arg(long)]
    pub drop_watches: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// How one member got through the barrier
#[derive(Debug, Serialize)]
pub struct MemberReport {
    pub member: String,
    pub role: Option<Role>,
    pub late: bool,
    pub elapsed_ms: u64,
}

/// Result of a whole round
#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub barrier: String,
    pub expected_members: usize,
    pub initiator: Option<String>,
    pub members: Vec<MemberReport>,
    /// Namespace left behind once every member has passed
    pub remaining: Vec<String>,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Barrier: {} ({} members)",
            self.barrier, self.expected_members
        )?;
        writeln!(
            f,
            "Initiator: {}",
            self.initiator.as_deref().unwrap_or("-")
        )?;
        writeln!(f)?;
        writeln!(f, "{:<16} {:<10} {:<5} ELAPSED", "MEMBER", "ROLE", "LATE")?;
        for m in &self.members {
            let role = m.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
            writeln!(
                f,
                "{:<16} {:<10} {:<5} {}ms",
                m.member,
                role,
                if m.late { "yes" } else { "no" },
                m.elapsed_ms
            )?;
        }
        writeln!(f)?;
        write!(f, "Remaining nodes:")?;
        if self.remaining.is_empty() {
            write!(f, " none")?;
        }
        for path in &self.remaining {
            write!(f, "\n  {}", path)?;
        }
        Ok(())
    }
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.barrier.resolve()?;
    let store = MemoryStore::new();
    store.record_calls(false);
    store.suppress_watches(args.drop_watches);

    let report = run_round(&store, &config, args.late, args.stagger).await?;
    output::print(&report, args.output)
}

/// Enter `config.expected_members` members concurrently, then `late` more
pub async fn run_round(
    store: &MemoryStore,
    config: &BarrierConfig,
    late: usize,
    stagger: Option<Duration>,
) -> Result<RoundReport> {
    let ids = SequentialIdGen::default();
    let on_time = spawn_members(store, config, &ids, config.expected_members)?;

    let cancel_on_ctrl_c = {
        let barriers: Vec<_> = on_time.iter().map(|(b, _)| Arc::clone(b)).collect();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling members");
                for barrier in &barriers {
                    if let Err(e) = barrier.cancel().await {
                        tracing::warn!(member = %barrier.member(), error = %e, "cancel failed");
                    }
                }
            }
        })
    };

    let mut handles = Vec::new();
    for (barrier, session) in &on_time {
        tracing::debug!(member = %barrier.member(), %session, "member arriving");
        handles.push(spawn_enter(Arc::clone(barrier), false));
        if let Some(delay) = stagger {
            tokio::time::sleep(delay).await;
        }
    }
    let results = collect(handles).await;
    cancel_on_ctrl_c.abort();
    let mut members = results.into_iter().collect::<Result<Vec<_>>>()?;

    let stragglers = spawn_members(store, config, &ids, late)?;
    let handles = stragglers
        .iter()
        .map(|(barrier, _)| spawn_enter(Arc::clone(barrier), true))
        .collect();
    for report in collect(handles).await {
        members.push(report?);
    }

    let initiator = members
        .iter()
        .find(|m| m.role == Some(Role::Initiator))
        .map(|m| m.member.clone());

    Ok(RoundReport {
        barrier: config.name.clone(),
        expected_members: config.expected_members,
        initiator,
        members,
        remaining: store.snapshot().iter().map(|p| p.to_string()).collect(),
    })
}

type Member = (Arc<Barrier<TracedStore<MemoryStore>>>, SessionId);

fn spawn_members(
    store: &MemoryStore,
    config: &BarrierConfig,
    ids: &impl IdGen,
    count: usize,
) -> Result<Vec<Member>> {
    (0..count)
        .map(|_| -> Result<Member> {
            let session = store.connect();
            let id = session.session_id();
            let barrier =
                Barrier::with_generated_id(TracedStore::new(session), config.clone(), ids)?;
            Ok((Arc::new(barrier), id))
        })
        .collect()
}

fn spawn_enter<S: CoordinationStore>(
    barrier: Arc<Barrier<S>>,
    late: bool,
) -> JoinHandle<Result<MemberReport>> {
    tokio::spawn(enter_member(barrier, late))
}

async fn enter_member<S: CoordinationStore>(
    barrier: Arc<Barrier<S>>,
    late: bool,
) -> Result<MemberReport> {
    let started = Instant::now();
    barrier
        .enter()
        .await
        .with_context(|| format!("member {} failed", barrier.member()))?;
    Ok(MemberReport {
        member: barrier.member().to_string(),
        role: barrier.role(),
        late,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

async fn collect(handles: Vec<JoinHandle<Result<MemberReport>>>) -> Vec<Result<MemberReport>> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(match handle.await {
            Ok(report) => report,
            Err(e) => Err(e.into()),
        });
    }
    reports
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
