// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod config;
pub mod run;

use anyhow::{Context, Result};
use clap::Args;
use rendezvous_core::BarrierConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Barrier settings shared by every command.
///
/// Flags override values loaded from `--config`.
#[derive(Args, Debug, Default)]
pub struct BarrierArgs {
    /// Barrier config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Barrier name
    #[arg(long)]
    pub barrier: Option<String>,

    /// Number of members expected to arrive
    #[arg(long)]
    pub members: Option<usize>,

    /// Backstop re-poll interval (e.g. "250ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,
}

impl BarrierArgs {
    /// Merge the config file and flags into a validated configuration
    pub fn resolve(&self) -> Result<BarrierConfig> {
        let mut config = match &self.config {
            Some(path) => BarrierConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let members = self
                    .members
                    .context("--members is required without --config")?;
                BarrierConfig::new(self.barrier.as_deref().unwrap_or("round1"), members)
            }
        };

        if let Some(name) = &self.barrier {
            config.name = name.clone();
        }
        if let Some(members) = self.members {
            config.expected_members = members;
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
