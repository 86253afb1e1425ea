//! Include and exclude globs for directory expansion
//!
//! Patterns are matched against a file's path relative to the directory being
//! expanded, and against its bare file name. `*` never crosses a path
//! separator, so `*.iso` matches at any depth through the file name while
//! `nested/*.iso` only matches inside `nested`. Excludes always win.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

use super::{DiscoveryError, Result};

/// Compiled include and exclude globs
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// `None` admits every file
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = if include.is_empty() {
            None
        } else {
            Some(compile(include)?)
        };

        Ok(Self {
            include,
            exclude: compile(exclude)?,
        })
    }

    /// Whether the file at `relative` (below the expanded directory) is hashed
    pub fn admits(&self, relative: &Path) -> bool {
        if matches_either(&self.exclude, relative) {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|include| matches_either(include, relative))
    }
}

fn compile(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| DiscoveryError::InvalidPattern(format!("{pattern}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DiscoveryError::InvalidPattern(e.to_string()))
}

fn matches_either(set: &GlobSet, relative: &Path) -> bool {
    set.is_match(relative)
        || relative
            .file_name()
            .is_some_and(|name| set.is_match(Path::new(name)))
}
