//! Key/value sources for variable interpolation
//!
//! Precedence is expressed by [`LayeredProperties`]: the first layer that
//! knows a key wins. The composition root typically stacks the process
//! environment over an optional `.env` file.

use crate::error::{ImportError, Result};
use camino::Utf8Path;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lookup of interpolation values by name
pub trait PropertyLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl PropertyLookup for EnvProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory values
#[derive(Debug, Clone, Default)]
pub struct MapProperties {
    values: HashMap<String, String>,
}

impl MapProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertyLookup for MapProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Values read from a `.env` file
///
/// The file is parsed once; the process environment is not modified.
#[derive(Debug, Clone, Default)]
pub struct DotenvProperties {
    values: MapProperties,
}

impl DotenvProperties {
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        debug!("Loading properties from {}", path);

        let mut values = MapProperties::new();
        let entries = dotenvy::from_path_iter(path.as_std_path())
            .map_err(|e| ImportError::parse(path, e.to_string()))?;

        for entry in entries {
            let (key, value) = entry.map_err(|e| ImportError::parse(path, e.to_string()))?;
            values.insert(key, value);
        }

        Ok(Self { values })
    }
}

impl PropertyLookup for DotenvProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.lookup(key)
    }
}

/// Ordered stack of lookups, first hit wins
#[derive(Clone, Default)]
pub struct LayeredProperties {
    layers: Vec<Arc<dyn PropertyLookup>>,
}

impl LayeredProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones
    pub fn push(mut self, layer: Arc<dyn PropertyLookup>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl PropertyLookup for LayeredProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.lookup(key))
    }
}

impl std::fmt::Debug for LayeredProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredProperties")
            .field("layers", &self.layers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_map_properties() {
        let props: MapProperties = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(props.lookup("a").as_deref(), Some("1"));
        assert_eq!(props.lookup("c"), None);
    }

    #[test]
    #[serial]
    fn test_env_properties() {
        std::env::set_var("REALMSYNC_TEST_PROPERTY", "from-env");
        assert_eq!(
            EnvProperties.lookup("REALMSYNC_TEST_PROPERTY").as_deref(),
            Some("from-env")
        );
        std::env::remove_var("REALMSYNC_TEST_PROPERTY");
        assert_eq!(EnvProperties.lookup("REALMSYNC_TEST_PROPERTY"), None);
    }

    #[test]
    fn test_dotenv_file() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join(".env")).unwrap();
        std::fs::write(&path, "# comment\nREALM=prod\nQUOTED=\"two words\"\n").unwrap();

        let props = DotenvProperties::from_path(&path).unwrap();
        assert_eq!(props.lookup("REALM").as_deref(), Some("prod"));
        assert_eq!(props.lookup("QUOTED").as_deref(), Some("two words"));
    }

    #[test]
    fn test_missing_dotenv_file() {
        let result = DotenvProperties::from_path(Utf8Path::new("/nonexistent/.env"));
        assert!(matches!(result, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn test_layered_first_hit_wins() {
        let layered = LayeredProperties::new()
            .push(Arc::new(MapProperties::new().with("a", "top")))
            .push(Arc::new(MapProperties::new().with("a", "bottom").with("b", "only")));

        assert_eq!(layered.len(), 2);
        assert_eq!(layered.lookup("a").as_deref(), Some("top"));
        assert_eq!(layered.lookup("b").as_deref(), Some("only"));
        assert_eq!(layered.lookup("c"), None);
    }
}
