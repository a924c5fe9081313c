//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Global config (<user config dir>/realmsync/config.yaml)
//! 3. Project config (--config, or realmsync.yaml found from the working directory upwards)
//! 4. Environment variables (REALMSYNC_* prefix)
//! 5. CLI flags (handled by caller)

use crate::config::loader::{find_project_config, merge_yaml, read_yaml_layer};
use crate::error::{Error, Result};
use crate::types::{RealmsyncConfig, SecureString};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "defaults.yaml";
const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Directory holding the global configuration file
    global_dir: Option<Utf8PathBuf>,

    /// Directory where the project configuration search starts
    working_dir: Utf8PathBuf,

    /// Explicit project configuration file; must exist when set
    project_file: Option<Utf8PathBuf>,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the current directory and the user's config directory
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir()?;
        let working_dir = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

        let global_dir = dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
            .map(|dir| dir.join("realmsync"));

        Ok(Self {
            global_dir,
            working_dir,
            project_file: None,
        })
    }

    /// Create a loader with custom global and working directories
    pub fn with_dirs(global_dir: Option<Utf8PathBuf>, working_dir: Utf8PathBuf) -> Self {
        Self {
            global_dir,
            working_dir,
            project_file: None,
        }
    }

    /// Use an explicit project configuration file instead of searching for one
    pub fn with_project_file(mut self, path: Option<&Utf8Path>) -> Self {
        self.project_file = path.map(Utf8Path::to_owned);
        self
    }

    /// Load configuration with hierarchical precedence
    pub fn load(&self) -> Result<RealmsyncConfig> {
        let mut merged = Self::load_embedded_layer(DEFAULTS_FILE)?;

        if let Some(global_dir) = &self.global_dir {
            let global_path = global_dir.join(GLOBAL_CONFIG_FILE);
            if global_path.is_file() {
                debug!("Loading global config from {}", global_path);
                merge_yaml(&mut merged, read_yaml_layer(&global_path)?);
            }
        }

        if let Some(project_path) = self.project_config_path()? {
            debug!("Loading project config from {}", project_path);
            merge_yaml(&mut merged, read_yaml_layer(&project_path)?);
        }

        let config: RealmsyncConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to load configuration: {}", e)))?;

        let config = Self::apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the project configuration file, if any
    pub fn project_config_path(&self) -> Result<Option<Utf8PathBuf>> {
        match &self.project_file {
            Some(path) if path.is_file() => Ok(Some(path.clone())),
            Some(path) => Err(Error::config_not_found(path.as_str())),
            None => Ok(find_project_config(&self.working_dir)),
        }
    }

    /// Load an embedded configuration file
    fn load_embedded_layer(filename: &str) -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: RealmsyncConfig) -> Result<RealmsyncConfig> {
        // Import sources
        if let Ok(val) = env::var("REALMSYNC_IMPORT_PATH") {
            config.import.path = split_list(&val);
        }

        if let Ok(val) = env::var("REALMSYNC_IMPORT_EXCLUDE") {
            config.import.exclude = split_list(&val);
        }

        if let Some(val) = parse_env("REALMSYNC_IMPORT_HIDDEN_FILES")? {
            config.import.hidden_files = val;
        }

        if let Some(val) = parse_env("REALMSYNC_IMPORT_FILE_TYPE")? {
            config.import.file_type = val;
        }

        if let Some(val) = parse_env("REALMSYNC_IMPORT_SORT")? {
            config.import.sort = val;
        }

        // Variable substitution
        let substitution = &mut config.import.var_substitution;
        if let Some(val) = parse_env("REALMSYNC_VAR_SUBSTITUTION_ENABLED")? {
            substitution.enabled = val;
        }

        if let Ok(val) = env::var("REALMSYNC_VAR_SUBSTITUTION_PREFIX") {
            substitution.prefix = val;
        }

        if let Ok(val) = env::var("REALMSYNC_VAR_SUBSTITUTION_SUFFIX") {
            substitution.suffix = val;
        }

        if let Some(val) = parse_env("REALMSYNC_VAR_SUBSTITUTION_IN_VARIABLES")? {
            substitution.in_variables = val;
        }

        if let Some(val) = parse_env("REALMSYNC_VAR_SUBSTITUTION_UNDEFINED_IS_ERROR")? {
            substitution.undefined_is_error = val;
        }

        // Remote state
        if let Some(val) = parse_env("REALMSYNC_REMOTE_STATE_ENABLED")? {
            config.remote_state.enabled = val;
        }

        if let Some(val) = parse_env("REALMSYNC_REMOTE_STATE_COMPACT")? {
            config.remote_state.compact = val;
        }

        if let Ok(val) = env::var("REALMSYNC_REMOTE_STATE_ENCRYPTION_KEY") {
            config.remote_state.encryption_key = if val.is_empty() {
                None
            } else {
                Some(SecureString::new(val))
            };
        }

        if let Ok(val) = env::var("REALMSYNC_REMOTE_STATE_ENCRYPTION_SALT") {
            config.remote_state.encryption_salt = val;
        }

        if let Some(val) = parse_env("REALMSYNC_REMOTE_STATE_CHUNK_SIZE")? {
            config.remote_state.chunk_size = val;
        }

        if let Ok(val) = env::var("REALMSYNC_REMOTE_STATE_NAMESPACE") {
            config.remote_state.namespace = val;
        }

        Ok(config)
    }

    /// Get the working directory used for the project config search
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }
}

/// Parse an optional environment variable, naming it in the error
fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{} has an invalid value: {}", name, val))),
        Err(_) => Ok(None),
    }
}

/// Split a comma-separated list, dropping blank entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
