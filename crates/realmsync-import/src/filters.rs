//! Exclusion of discovered import files by glob pattern
//!
//! Patterns are matched against the file's absolute identity path and, when
//! the file lies below the base directory, against its relative path too, so
//! both `/srv/realms/*_test.*` and `*_test.*` style patterns work.

use crate::error::{ImportError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclude patterns
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
    globset: GlobSet,
    base_dir: Utf8PathBuf,
}

impl ExclusionFilter {
    pub fn new(patterns: &[String], base_dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| ImportError::invalid_pattern(pattern.as_str(), e.to_string()))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| ImportError::invalid_pattern(patterns.join(", "), e.to_string()))?;

        Ok(Self {
            patterns: patterns.to_vec(),
            globset,
            base_dir: base_dir.into(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The first configured pattern matching the path, if any
    pub fn matching_pattern(&self, path: &Utf8Path) -> Option<&str> {
        if self.is_empty() {
            return None;
        }

        let mut hits = self.globset.matches(path.as_std_path());
        if hits.is_empty() {
            if let Ok(relative) = path.strip_prefix(&self.base_dir) {
                hits = self.globset.matches(relative.as_std_path());
            }
        }

        hits.into_iter()
            .min()
            .map(|index| self.patterns[index].as_str())
    }

    pub fn should_exclude(&self, path: &Utf8Path) -> bool {
        self.matching_pattern(path).is_some()
    }
}
