// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchical node paths
//!
//! Paths are absolute, slash-separated, and never end in a slash (except the
//! root itself). Each segment is a non-empty name without `/`.

use super::StoreError;
use std::fmt;

/// An absolute path in the coordination namespace
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    /// The namespace root, `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute path
    pub fn parse(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        if path == "/" {
            return Ok(Self::root());
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Err(StoreError::InvalidPath(format!(
                "path must be absolute: {path}"
            )));
        };
        for segment in rest.split('/') {
            validate_segment(segment).map_err(|reason| {
                StoreError::InvalidPath(format!("{path}: {reason}"))
            })?;
        }
        Ok(Self(path))
    }

    /// Path of a direct child named `name`
    pub fn child(&self, name: &str) -> Result<Self, StoreError> {
        validate_segment(name)
            .map_err(|reason| StoreError::InvalidPath(format!("{name:?}: {reason}")))?;
        if self.is_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Last segment of the path (empty for the root)
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Whether `self` lies strictly beneath `ancestor`
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0
            .strip_prefix(&ancestor.0)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that `name` is usable as a single path segment
pub fn validate_segment(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty path segment");
    }
    if name.contains('/') {
        return Err("segment contains '/'");
    }
    if name == "." || name == ".." {
        return Err("relative segments are not allowed");
    }
    if name.chars().any(char::is_control) {
        return Err("segment contains control characters");
    }
    Ok(())
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
