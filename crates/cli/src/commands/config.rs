// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rvz config` - Validate and print the effective configuration

use super::BarrierArgs;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use rendezvous_core::BarrierConfig;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub barrier: BarrierArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// Configuration rendered as TOML in text mode
#[derive(Serialize)]
#[serde(transparent)]
struct Effective(BarrierConfig);

impl fmt::Display for Effective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toml = self.0.to_toml().map_err(|_| fmt::Error)?;
        write!(f, "{}", toml.trim_end())
    }
}

pub fn config(args: ConfigArgs) -> Result<()> {
    let config = args.barrier.resolve()?;
    output::print(&Effective(config), args.output)
}
