//! The import pipeline
//!
//! [`ImportProvider`] turns configured path patterns into an ordered,
//! checksummed set of parsed documents:
//!
//! 1. resolve each pattern into resources (first failure aborts)
//! 2. extract candidate files with the first capable extractor
//! 3. drop excluded files
//! 4. sort with the configured comparator (stable, discovery order breaks ties)
//! 5. read, interpolate, checksum and parse each file in order

use crate::checksum::content_checksum;
use crate::error::{ImportError, Result};
use crate::extractor::{ExtractorDispatcher, SourceFile};
use crate::filters::ExclusionFilter;
use crate::interpolation::Interpolator;
use crate::order::FileOrder;
use crate::parser::DocumentParser;
use crate::properties::PropertyLookup;
use crate::resource::ResourceResolver;
use camino::{Utf8Path, Utf8PathBuf};
use realmsync_core::{DesiredStateDocument, FileType, ImportSettings};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One discovered, loaded and parsed import file
#[derive(Debug, Clone)]
pub struct ImportUnit {
    /// Normalized absolute identity path
    pub path: Utf8PathBuf,
    /// Identity after resolving symlinks
    pub canonical_path: Utf8PathBuf,
    pub raw_content: String,
    /// Content after variable interpolation
    pub content: String,
    /// SHA-256 of the interpolated content
    pub checksum: String,
    pub documents: Vec<DesiredStateDocument>,
    /// Position in discovery order, before sorting
    pub discovery_index: usize,
}

/// Ordered result of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    units: Vec<ImportUnit>,
}

impl ImportSet {
    pub fn iter(&self) -> std::slice::Iter<'_, ImportUnit> {
        self.units.iter()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<&ImportUnit> {
        self.units.iter().find(|unit| unit.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.units.iter().map(|unit| unit.path.as_path())
    }

    /// All documents, in file order then document order
    pub fn documents(&self) -> impl Iterator<Item = &DesiredStateDocument> {
        self.units.iter().flat_map(|unit| unit.documents.iter())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<ImportUnit> {
        self.units
    }
}

impl IntoIterator for ImportSet {
    type Item = ImportUnit;
    type IntoIter = std::vec::IntoIter<ImportUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImportSet {
    type Item = &'a ImportUnit;
    type IntoIter = std::slice::Iter<'a, ImportUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// A file found during discovery, before loading
#[derive(Debug)]
struct Discovered {
    file: SourceFile,
    canonical_path: Utf8PathBuf,
    index: usize,
}

/// Import pipeline wired from [`ImportSettings`]
#[derive(Debug)]
pub struct ImportProvider {
    paths: Vec<String>,
    resolver: ResourceResolver,
    dispatcher: ExtractorDispatcher,
    filter: ExclusionFilter,
    order: FileOrder,
    interpolator: Option<Interpolator>,
    parser: DocumentParser,
    file_type: FileType,
}

impl ImportProvider {
    /// Build the pipeline; relative patterns resolve against `base_dir`
    pub fn new(
        settings: &ImportSettings,
        base_dir: impl Into<Utf8PathBuf>,
        properties: Arc<dyn PropertyLookup>,
    ) -> Result<Self> {
        if settings.var_substitution.enabled {
            settings.var_substitution.validate()?;
        }

        let resolver = ResourceResolver::new(base_dir, settings.hidden_files);
        let base_dir = resolver.base_dir().to_path_buf();

        let interpolator = settings
            .var_substitution
            .enabled
            .then(|| Interpolator::new(&settings.var_substitution, properties));

        Ok(Self {
            paths: settings.path.clone(),
            dispatcher: ExtractorDispatcher::standard(settings.hidden_files, base_dir.clone()),
            filter: ExclusionFilter::new(&settings.exclude, base_dir)?,
            resolver,
            order: settings.sort.into(),
            interpolator,
            parser: DocumentParser::new(),
            file_type: settings.file_type,
        })
    }

    pub fn with_dispatcher(mut self, dispatcher: ExtractorDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_order(mut self, order: FileOrder) -> Self {
        self.order = order;
        self
    }

    pub fn base_dir(&self) -> &Utf8Path {
        self.resolver.base_dir()
    }

    /// Run the pipeline over the configured `import.path` patterns
    pub fn get(&self) -> Result<ImportSet> {
        if self.paths.is_empty() {
            return Err(realmsync_core::Error::invalid_config(
                "import path must name at least one location",
            )
            .into());
        }
        self.resolve(&self.paths)
    }

    /// Run the pipeline over the given patterns
    pub fn resolve(&self, patterns: &[String]) -> Result<ImportSet> {
        let discovered = self.discover(patterns)?;

        let mut kept: Vec<Discovered> = discovered
            .into_iter()
            .filter(|found| match self.filter.matching_pattern(found.file.path()) {
                Some(pattern) => {
                    debug!(
                        "Excluding resource file '{}' (match {})",
                        found.file.path(),
                        pattern
                    );
                    false
                }
                None => true,
            })
            .collect();

        self.order.sort_by_path(&mut kept, |found| found.file.path());

        let units = kept
            .into_iter()
            .map(|found| self.load(found))
            .collect::<Result<Vec<_>>>()?;

        info!("{} configuration files found.", units.len());
        Ok(ImportSet { units })
    }

    /// Load, interpolate, checksum and parse one known file, skipping discovery
    pub fn resolve_single(&self, path: impl AsRef<Utf8Path>) -> Result<Vec<DesiredStateDocument>> {
        let path = self.resolver.absolutize(path);
        let file = SourceFile::on_disk(path);
        let canonical_path = file.canonical_path()?;

        let unit = self.load(Discovered {
            file,
            canonical_path,
            index: 0,
        })?;
        Ok(unit.documents)
    }

    fn discover(&self, patterns: &[String]) -> Result<Vec<Discovered>> {
        let mut discovered = Vec::new();
        let mut by_path: HashMap<Utf8PathBuf, String> = HashMap::new();
        let mut by_canonical: HashMap<Utf8PathBuf, (Utf8PathBuf, String)> = HashMap::new();

        for pattern in patterns {
            for resource in self.resolver.resolve(pattern)? {
                for file in self.dispatcher.dispatch(&resource)? {
                    if let Some(first) = by_path.get(file.path()) {
                        if first == pattern {
                            debug!("Skipping {} (already found via '{}')", file.path(), pattern);
                            continue;
                        }
                        return Err(ImportError::duplicate_source(
                            file.path(),
                            format!("pattern '{}'", first),
                            format!("pattern '{}'", pattern),
                        ));
                    }

                    // Aliases (symlinks) are only a conflict across patterns
                    let canonical_path = file.canonical_path()?;
                    if let Some((first, first_pattern)) = by_canonical.get(&canonical_path) {
                        if first_pattern != pattern {
                            return Err(ImportError::duplicate_source(
                                canonical_path.clone(),
                                first.as_str(),
                                file.path().as_str(),
                            ));
                        }
                    } else {
                        by_canonical.insert(
                            canonical_path.clone(),
                            (file.path().to_path_buf(), pattern.clone()),
                        );
                    }

                    by_path.insert(file.path().to_path_buf(), pattern.clone());
                    discovered.push(Discovered {
                        file,
                        canonical_path,
                        index: discovered.len(),
                    });
                }
            }
        }

        Ok(discovered)
    }

    fn load(&self, found: Discovered) -> Result<ImportUnit> {
        let Discovered {
            file,
            canonical_path,
            index,
        } = found;
        let path = file.path().to_path_buf();

        info!("Loading file '{}'", path);
        let raw_content = file.read_to_string()?;

        let content = match &self.interpolator {
            Some(interpolator) => interpolator
                .interpolate(&raw_content)
                .map_err(|e| ImportError::interpolation(path.clone(), e.to_string()))?,
            None => raw_content.clone(),
        };

        let checksum = content_checksum(&content);
        let format = self
            .parser
            .detect_format(&path, file.file_name(), self.file_type)?;
        let documents = self
            .parser
            .parse(&path, format, &content)?
            .into_iter()
            .map(|document| document.with_checksum(checksum.as_str()))
            .collect();

        Ok(ImportUnit {
            path,
            canonical_path,
            raw_content,
            content,
            checksum,
            documents,
            discovery_index: index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::MapProperties;
    use std::fs;
    use tempfile::TempDir;

    fn provider(settings: &ImportSettings) -> (ImportProvider, TempDir) {
        let temp = TempDir::new().unwrap();
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let provider =
            ImportProvider::new(settings, base, Arc::new(MapProperties::new())).unwrap();
        (provider, temp)
    }

    #[test]
    fn test_get_requires_paths() {
        let (provider, _temp) = provider(&ImportSettings::default());
        assert!(matches!(provider.get(), Err(ImportError::Config(_))));
    }

    #[test]
    fn test_same_pattern_duplicates_are_kept_once() {
        let (provider, _temp) = provider(&ImportSettings::default());
        let realms = provider.base_dir().join("realms");
        fs::create_dir_all(realms.join("nested")).unwrap();
        fs::write(realms.join("a.yaml"), "realm: a\n").unwrap();
        fs::write(realms.join("nested/b.yaml"), "realm: b\n").unwrap();

        // `realms/**` matches `nested` and the file inside it
        let set = provider.resolve(&["realms/**".to_string()]).unwrap();
        let realms: Vec<&str> = set.documents().map(|d| d.realm.as_str()).collect();
        assert_eq!(realms, vec!["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_alias_within_one_pattern_is_kept() {
        let (provider, _temp) = provider(&ImportSettings::default());
        let realms = provider.base_dir().join("realms");
        fs::create_dir(&realms).unwrap();
        fs::write(realms.join("a.yaml"), "realm: a\n").unwrap();
        std::os::unix::fs::symlink(realms.join("a.yaml"), realms.join("b.yaml")).unwrap();

        let set = provider.resolve(&["realms".to_string()]).unwrap();
        assert_eq!(set.len(), 2);
        let units: Vec<_> = set.iter().collect();
        assert_eq!(units[0].canonical_path, units[1].canonical_path);
    }

    #[test]
    fn test_unusable_delimiters_rejected() {
        let mut settings = ImportSettings::default();
        settings.var_substitution.enabled = true;
        settings.var_substitution.prefix = String::new();
        settings.var_substitution.suffix = String::new();
        settings.var_substitution.undefined_is_error = false;
        let temp = TempDir::new().unwrap();
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

        let result = ImportProvider::new(&settings, base.clone(), Arc::new(MapProperties::new()));
        assert!(matches!(result, Err(ImportError::Config(_))));

        settings.var_substitution.prefix = "%".to_string();
        settings.var_substitution.suffix = "%".to_string();
        settings.var_substitution.in_variables = true;
        let result = ImportProvider::new(&settings, base.clone(), Arc::new(MapProperties::new()));
        assert!(matches!(result, Err(ImportError::Config(_))));

        // Equal delimiters are fine without nesting
        settings.var_substitution.in_variables = false;
        assert!(ImportProvider::new(&settings, base, Arc::new(MapProperties::new())).is_ok());
    }

    #[test]
    fn test_discovery_index_survives_sorting() {
        let (provider, _temp) = provider(&ImportSettings::default());
        let base = provider.base_dir().to_path_buf();
        fs::write(base.join("b.yaml"), "realm: b\n").unwrap();
        fs::write(base.join("a.yaml"), "realm: a\n").unwrap();

        let set = provider
            .resolve(&["b.yaml".to_string(), "a.yaml".to_string()])
            .unwrap();
        let units: Vec<_> = set.iter().collect();
        assert_eq!(units[0].path, base.join("a.yaml"));
        assert_eq!(units[0].discovery_index, 1);
        assert_eq!(units[1].discovery_index, 0);
    }

    #[test]
    fn test_raw_content_kept_next_to_interpolated() {
        let mut settings = ImportSettings::default();
        settings.var_substitution.enabled = true;
        let temp = TempDir::new().unwrap();
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::write(base.join("r.yaml"), "realm: ${name}\n").unwrap();

        let props = MapProperties::new().with("name", "prod");
        let provider = ImportProvider::new(&settings, base.clone(), Arc::new(props)).unwrap();
        let set = provider.resolve(&["r.yaml".to_string()]).unwrap();
        let unit = set.get(&base.join("r.yaml")).unwrap();

        assert_eq!(unit.raw_content, "realm: ${name}\n");
        assert_eq!(unit.content, "realm: prod\n");
        assert_eq!(unit.checksum, content_checksum("realm: prod\n"));
    }
}
