//! Directory sources: the immediate children of a directory

use super::{has_hidden_component, is_hidden_name, SourceFile};
use crate::resource::Resource;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct DirectoryExtractor {
    hidden_files: bool,
    base_dir: Utf8PathBuf,
}

impl DirectoryExtractor {
    /// `base_dir` anchors the hidden-ancestor check
    pub fn new(hidden_files: bool, base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            hidden_files,
            base_dir: base_dir.into(),
        }
    }

    /// A readable directory that is not itself hidden (unless hidden files are allowed)
    pub fn can_handle(&self, resource: &Resource) -> bool {
        let location = resource.location();
        let is_dir = fs::metadata(location).map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir || fs::read_dir(location).is_err() {
            return false;
        }

        self.hidden_files || !location.file_name().is_some_and(is_hidden_name)
    }

    /// Regular files directly inside the directory, sorted by name
    ///
    /// Listing errors are logged and skipped so a directory that changes or
    /// becomes unreadable mid-listing yields what could be read.
    pub fn extract(&self, resource: &Resource) -> Vec<SourceFile> {
        let location = resource.location();
        let mut files = Vec::new();

        let walker = WalkDir::new(location)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot list entry in {}: {}", location, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
                Ok(path) => path,
                Err(path) => {
                    warn!("Skipping non UTF-8 path {}", path.display());
                    continue;
                }
            };

            if !self.hidden_files && self.is_hidden(&path) {
                debug!("Skipping hidden file {}", path);
                continue;
            }

            files.push(SourceFile::on_disk(path));
        }

        files
    }

    /// Hidden file name, or a hidden directory between the base and the file
    fn is_hidden(&self, path: &Utf8Path) -> bool {
        if path.file_name().is_some_and(is_hidden_name) {
            return true;
        }

        let scoped = path.strip_prefix(&self.base_dir).unwrap_or(path);
        scoped.parent().is_some_and(has_hidden_component)
    }
}
