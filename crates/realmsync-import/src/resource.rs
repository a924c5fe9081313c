//! Resolution of configured path patterns into filesystem resources
//!
//! A pattern may be a bare path, a `file:` URL or a glob. Relative paths are
//! resolved against the resolver's base directory. Resolution never guesses:
//! a path that does not exist or a glob without matches is an error.

use crate::error::{ImportError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, warn};

/// Final pattern component matching every path below its parent
const RECURSIVE_WILDCARD: &str = "**";

/// A concrete location produced by resolving a configured pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    location: Utf8PathBuf,
    pattern: String,
}

impl Resource {
    pub fn new(location: impl Into<Utf8PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            pattern: pattern.into(),
        }
    }

    /// Absolute, lexically normalized location
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }

    /// The configured pattern this resource was resolved from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Resolves path patterns relative to a base directory
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    base_dir: Utf8PathBuf,
    hidden_files: bool,
}

impl ResourceResolver {
    /// Create a resolver; `base_dir` should be absolute
    pub fn new(base_dir: impl Into<Utf8PathBuf>, hidden_files: bool) -> Self {
        Self {
            base_dir: normalize_lexically(&base_dir.into()),
            hidden_files,
        }
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Resolve one configured pattern into zero or more resources
    ///
    /// Returns an error instead of an empty list when nothing exists at the
    /// pattern.
    pub fn resolve(&self, pattern: &str) -> Result<Vec<Resource>> {
        let path = strip_file_scheme(pattern)?;

        if is_glob(path) {
            return self.expand_glob(pattern, path);
        }

        let location = self.absolutize(path);
        if fs::metadata(&location).is_err() {
            return Err(ImportError::resource_resolution(
                pattern,
                format!("{} does not exist", location),
            ));
        }

        debug!("Resolved '{}' to {}", pattern, location);
        Ok(vec![Resource::new(location, pattern)])
    }

    /// Make a path absolute against the base directory and fold `.`/`..`
    pub fn absolutize(&self, path: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            normalize_lexically(path)
        } else {
            normalize_lexically(&self.base_dir.join(path))
        }
    }

    /// Path relative to the base directory, when it lies beneath it
    pub fn relative_to_base<'a>(&self, path: &'a Utf8Path) -> Option<&'a Utf8Path> {
        path.strip_prefix(&self.base_dir).ok()
    }

    fn expand_glob(&self, pattern: &str, path: &str) -> Result<Vec<Resource>> {
        let mut absolute = if Utf8Path::new(path).is_absolute() {
            Utf8PathBuf::from(path)
        } else {
            self.base_dir.join(path)
        };

        // `dir/**` means everything below `dir`
        if absolute.file_name() == Some(RECURSIVE_WILDCARD) {
            absolute.push("*");
        }

        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: !self.hidden_files,
        };

        let matches = glob::glob_with(absolute.as_str(), options)
            .map_err(|e| ImportError::invalid_pattern(pattern, e.to_string()))?;

        let mut resources = Vec::new();
        for entry in matches {
            match entry {
                Ok(found) => {
                    let found = Utf8PathBuf::from_path_buf(found).map_err(|p| {
                        ImportError::resource_resolution(
                            pattern,
                            format!("{} is not valid UTF-8", p.display()),
                        )
                    })?;
                    resources.push(Resource::new(normalize_lexically(&found), pattern));
                }
                Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e.error()),
            }
        }

        if resources.is_empty() {
            return Err(ImportError::resource_resolution(
                pattern,
                "pattern did not match any file or directory",
            ));
        }

        debug!("Resolved '{}' to {} resources", pattern, resources.len());
        Ok(resources)
    }
}

/// Fold `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match normalized.components().next_back() {
                Some(Utf8Component::Normal(_)) => {
                    normalized.pop();
                }
                // `..` above the root stays at the root
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_str()),
        }
    }

    if normalized.as_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Strip a `file:` scheme; reject every other URL scheme
fn strip_file_scheme(pattern: &str) -> Result<&str> {
    if let Some(rest) = pattern.strip_prefix("file://") {
        return Ok(rest);
    }
    if let Some(rest) = pattern.strip_prefix("file:") {
        return Ok(rest);
    }

    if let Some((scheme, _)) = pattern.split_once(':') {
        // Single letters are drive prefixes on Windows, not schemes
        let looks_like_scheme = scheme.len() >= 2
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if looks_like_scheme {
            return Err(ImportError::resource_resolution(
                pattern,
                format!("unsupported URL scheme '{}:'", scheme),
            ));
        }
    }

    Ok(pattern)
}
