//! Source extractors
//!
//! An extractor turns one resolved [`Resource`] into the candidate import
//! files it contains. The variants are tried in a fixed order by the
//! [`ExtractorDispatcher`]; the first one that can handle a resource wins.

mod archive;
mod directory;
mod file;

pub use archive::ArchiveExtractor;
pub use directory::DirectoryExtractor;
pub use file::FileExtractor;

use crate::error::{ImportError, Result};
use crate::resource::Resource;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;

/// Where the bytes of a discovered file live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOrigin {
    /// A regular file on disk at the identity path
    Disk,
    /// A member of an archive, read into memory during extraction
    ArchiveEntry {
        archive: Utf8PathBuf,
        entry: String,
        data: Vec<u8>,
    },
}

/// A candidate import file produced by an extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: Utf8PathBuf,
    origin: FileOrigin,
}

impl SourceFile {
    pub fn on_disk(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: FileOrigin::Disk,
        }
    }

    /// Archive member; the identity path is `<archive>!/<entry>`
    pub fn archive_entry(archive: &Utf8Path, entry: impl Into<String>, data: Vec<u8>) -> Self {
        let entry = entry.into();
        Self {
            path: Utf8PathBuf::from(format!("{}!/{}", archive, entry)),
            origin: FileOrigin::ArchiveEntry {
                archive: archive.to_path_buf(),
                entry,
                data,
            },
        }
    }

    /// Identity path used for deduplication, exclusion and ordering
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn origin(&self) -> &FileOrigin {
        &self.origin
    }

    /// Name used for extension dispatch
    pub fn file_name(&self) -> Option<&str> {
        match &self.origin {
            FileOrigin::Disk => self.path.file_name(),
            FileOrigin::ArchiveEntry { entry, .. } => Utf8Path::new(entry).file_name(),
        }
    }

    /// Read the file as UTF-8 text
    pub fn read_to_string(&self) -> Result<String> {
        match &self.origin {
            FileOrigin::Disk => fs::read_to_string(&self.path).map_err(|source| ImportError::Read {
                path: self.path.clone(),
                source,
            }),
            FileOrigin::ArchiveEntry { data, .. } => String::from_utf8(data.clone()).map_err(|e| {
                ImportError::Read {
                    path: self.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                }
            }),
        }
    }

    /// Path after resolving symlinks, used to detect aliased sources
    pub fn canonical_path(&self) -> Result<Utf8PathBuf> {
        let canonicalize = |path: &Utf8Path| {
            path.canonicalize_utf8().map_err(|source| ImportError::Read {
                path: path.to_path_buf(),
                source,
            })
        };

        match &self.origin {
            FileOrigin::Disk => canonicalize(&self.path),
            FileOrigin::ArchiveEntry { archive, entry, .. } => {
                let archive = canonicalize(archive)?;
                Ok(Utf8PathBuf::from(format!("{}!/{}", archive, entry)))
            }
        }
    }
}

/// The extractor variants, in no particular order
#[derive(Debug, Clone)]
pub enum SourceExtractor {
    Archive(ArchiveExtractor),
    Directory(DirectoryExtractor),
    File(FileExtractor),
}

impl SourceExtractor {
    pub fn name(&self) -> &'static str {
        match self {
            SourceExtractor::Archive(_) => "archive",
            SourceExtractor::Directory(_) => "directory",
            SourceExtractor::File(_) => "file",
        }
    }

    /// Whether this extractor understands the resource; never fails
    pub fn can_handle(&self, resource: &Resource) -> bool {
        match self {
            SourceExtractor::Archive(e) => e.can_handle(resource),
            SourceExtractor::Directory(e) => e.can_handle(resource),
            SourceExtractor::File(e) => e.can_handle(resource),
        }
    }

    /// List the candidate files of the resource
    pub fn extract(&self, resource: &Resource) -> Result<Vec<SourceFile>> {
        match self {
            SourceExtractor::Archive(e) => e.extract(resource),
            SourceExtractor::Directory(e) => Ok(e.extract(resource)),
            SourceExtractor::File(e) => Ok(e.extract(resource)),
        }
    }
}

/// Ordered list of extractors; the first capable one handles a resource
#[derive(Debug, Clone)]
pub struct ExtractorDispatcher {
    extractors: Vec<SourceExtractor>,
}

impl ExtractorDispatcher {
    pub fn new(extractors: Vec<SourceExtractor>) -> Self {
        Self { extractors }
    }

    /// Archive, then directory, then plain file
    pub fn standard(hidden_files: bool, base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self::new(vec![
            SourceExtractor::Archive(ArchiveExtractor::new(hidden_files)),
            SourceExtractor::Directory(DirectoryExtractor::new(hidden_files, base_dir)),
            SourceExtractor::File(FileExtractor),
        ])
    }

    pub fn extractors(&self) -> &[SourceExtractor] {
        &self.extractors
    }

    /// First extractor that can handle the resource
    pub fn select(&self, resource: &Resource) -> Option<&SourceExtractor> {
        self.extractors.iter().find(|e| e.can_handle(resource))
    }

    /// Extract the files of a resource with the first capable extractor
    pub fn dispatch(&self, resource: &Resource) -> Result<Vec<SourceFile>> {
        let extractor = self.select(resource).ok_or_else(|| {
            ImportError::resource_resolution(
                resource.location().as_str(),
                format!(
                    "no extractor can handle this path (configured as '{}')",
                    resource.pattern()
                ),
            )
        })?;

        debug!(
            "Using {} extractor for {}",
            extractor.name(),
            resource.location()
        );
        extractor.extract(resource)
    }
}

/// Dot-files are hidden; `.` and `..` are not
pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Whether any normal component of the path is hidden
pub(crate) fn has_hidden_component(path: &Utf8Path) -> bool {
    path.components()
        .any(|c| matches!(c, Utf8Component::Normal(name) if is_hidden_name(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn visible_tempdir() -> TempDir {
        tempfile::Builder::new().prefix("realmsync-").tempdir().unwrap()
    }

    #[test]
    fn test_hidden_names() {
        assert!(is_hidden_name(".git"));
        assert!(!is_hidden_name("."));
        assert!(!is_hidden_name(".."));
        assert!(!is_hidden_name("realm.yaml"));
    }

    #[test]
    fn test_hidden_component() {
        assert!(has_hidden_component(Utf8Path::new("a/.secret/b.yaml")));
        assert!(!has_hidden_component(Utf8Path::new("../a/./b.yaml")));
    }

    #[test]
    fn test_dispatch_prefers_directory_over_file() {
        let temp = visible_tempdir();
        let base = utf8(&temp);
        fs::write(base.join("a.yaml"), "realm: a").unwrap();

        let dispatcher = ExtractorDispatcher::standard(false, base.clone());
        let resource = Resource::new(base.clone(), ".");
        assert_eq!(dispatcher.select(&resource).unwrap().name(), "directory");

        let files = dispatcher.dispatch(&resource).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path(), base.join("a.yaml"));
    }

    #[test]
    fn test_dispatch_without_capable_extractor() {
        let temp = TempDir::new().unwrap();
        let base = utf8(&temp);
        let dispatcher = ExtractorDispatcher::new(vec![SourceExtractor::File(FileExtractor)]);

        let err = dispatcher
            .dispatch(&Resource::new(base.clone(), "dir"))
            .unwrap_err();
        assert!(matches!(err, ImportError::ResourceResolution { .. }));
        assert!(err.to_string().contains(base.as_str()));
    }

    #[test]
    fn test_archive_entry_identity() {
        let file = SourceFile::archive_entry(
            Utf8Path::new("/srv/realms.tar"),
            "team/realm.yaml",
            b"realm: x".to_vec(),
        );
        assert_eq!(file.path().as_str(), "/srv/realms.tar!/team/realm.yaml");
        assert_eq!(file.file_name(), Some("realm.yaml"));
        assert_eq!(file.read_to_string().unwrap(), "realm: x");
    }
}
