// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier configuration
//!
//! ```toml
//! name = "round1"
//! expected_members = 3
//! poll_interval = "1s"
//! ```

use super::ALL_CLEAR;
use crate::id::MemberId;
use crate::store::path::validate_segment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from building or loading a barrier configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid barrier name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("invalid member id {member:?}: {reason}")]
    InvalidMember { member: String, reason: String },
    #[error("expected member count must be at least 1")]
    NoMembers,
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse barrier config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize barrier config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn default_poll_interval() -> Duration {
    BarrierConfig::DEFAULT_POLL_INTERVAL
}

/// Parameters of one barrier round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarrierConfig {
    /// Barrier name; the root entry lives at `/<name>`
    pub name: String,
    /// Number of members that must arrive before anyone proceeds
    pub expected_members: usize,
    /// Backstop re-poll interval for missed or coalesced watch notifications
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

impl BarrierConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(name: impl Into<String>, expected_members: usize) -> Self {
        Self {
            name: name.into(),
            expected_members,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_segment(&self.name).map_err(|reason| ConfigError::InvalidName {
            name: self.name.clone(),
            reason: reason.to_string(),
        })?;
        if self.expected_members == 0 {
            return Err(ConfigError::NoMembers);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Check that `member` can name a member entry under a barrier root
pub fn validate_member(member: &MemberId) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidMember {
        member: member.0.clone(),
        reason: reason.to_string(),
    };
    validate_segment(member.as_str()).map_err(invalid)?;
    if member.as_str() == ALL_CLEAR {
        return Err(invalid("reserved for the all-clear marker"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
