//! Deterministic ordering of discovered import files

use camino::Utf8Path;
use realmsync_core::SortOrder;
use std::cmp::Ordering;
use std::fmt;

/// Comparator over identity paths
///
/// Sorting is stable, so files that compare equal keep their discovery order.
#[derive(Clone, Copy, Default)]
pub enum FileOrder {
    /// Absolute path, byte-wise and case-sensitive
    #[default]
    Path,
    /// File name, then absolute path
    FileName,
    Custom(fn(&Utf8Path, &Utf8Path) -> Ordering),
}

impl FileOrder {
    pub fn compare(&self, a: &Utf8Path, b: &Utf8Path) -> Ordering {
        match self {
            FileOrder::Path => a.as_str().cmp(b.as_str()),
            FileOrder::FileName => a
                .file_name()
                .cmp(&b.file_name())
                .then_with(|| a.as_str().cmp(b.as_str())),
            FileOrder::Custom(compare) => compare(a, b),
        }
    }

    /// Stable sort by the path each item exposes
    pub fn sort_by_path<T>(&self, items: &mut [T], path: impl Fn(&T) -> &Utf8Path) {
        items.sort_by(|a, b| self.compare(path(a), path(b)));
    }
}

impl From<SortOrder> for FileOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Path => FileOrder::Path,
            SortOrder::FileName => FileOrder::FileName,
        }
    }
}

impl fmt::Debug for FileOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrder::Path => write!(f, "Path"),
            FileOrder::FileName => write!(f, "FileName"),
            FileOrder::Custom(_) => write!(f, "Custom"),
        }
    }
}
