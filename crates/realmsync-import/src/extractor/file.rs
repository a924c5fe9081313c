//! Single regular files

use super::SourceFile;
use crate::resource::Resource;
use std::fs;

/// Accepts any regular file and yields exactly that file
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtractor;

impl FileExtractor {
    pub fn can_handle(&self, resource: &Resource) -> bool {
        fs::metadata(resource.location())
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    pub fn extract(&self, resource: &Resource) -> Vec<SourceFile> {
        vec![SourceFile::on_disk(resource.location())]
    }
}
