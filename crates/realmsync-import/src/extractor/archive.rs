//! Tar archives (optionally gzip-compressed) as import sources

use super::{has_hidden_component, SourceFile};
use crate::error::{ImportError, Result};
use crate::resource::Resource;
use camino::Utf8Path;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use tracing::debug;

/// Supported archive layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Tar,
    TarGz,
}

impl ArchiveKind {
    fn detect(path: &Utf8Path) -> Option<Self> {
        let name = path.file_name()?;
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Yields every regular file inside a `.tar`, `.tar.gz` or `.tgz` archive
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    hidden_files: bool,
}

impl ArchiveExtractor {
    pub fn new(hidden_files: bool) -> Self {
        Self { hidden_files }
    }

    pub fn can_handle(&self, resource: &Resource) -> bool {
        let location = resource.location();
        ArchiveKind::detect(location).is_some()
            && fs::metadata(location).map(|m| m.is_file()).unwrap_or(false)
    }

    pub fn extract(&self, resource: &Resource) -> Result<Vec<SourceFile>> {
        let location = resource.location();
        let kind = ArchiveKind::detect(location).ok_or_else(|| {
            ImportError::resource_resolution(location.as_str(), "not a tar archive")
        })?;

        let file = File::open(location).map_err(|source| ImportError::Read {
            path: location.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let files = match kind {
            ArchiveKind::Tar => self.read_entries(location, reader),
            ArchiveKind::TarGz => self.read_entries(location, GzDecoder::new(reader)),
        }
        .map_err(|e| {
            ImportError::resource_resolution(
                location.as_str(),
                format!("failed to read archive: {}", e),
            )
        })?;

        debug!("Extracted {} files from archive {}", files.len(), location);
        Ok(files)
    }

    fn read_entries<R: Read>(
        &self,
        location: &Utf8Path,
        reader: R,
    ) -> std::io::Result<Vec<SourceFile>> {
        let mut archive = tar::Archive::new(reader);
        let mut files = Vec::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let raw = entry.path()?.to_string_lossy().into_owned();
            let name = raw.trim_start_matches("./").to_string();
            if name.is_empty() {
                continue;
            }
            if !self.hidden_files && has_hidden_component(Utf8Path::new(&name)) {
                debug!("Skipping hidden archive entry {}", name);
                continue;
            }

            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            files.push(SourceFile::archive_entry(location, name, data));
        }

        Ok(files)
    }
}
