//! Command implementations

pub mod config;
pub mod import;
pub mod state;
pub mod version;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use realmsync_core::{HierarchicalConfigLoader, RealmsyncConfig};

/// Effective configuration plus the directory relative paths resolve against
pub struct LoadedConfig {
    pub config: RealmsyncConfig,
    pub working_dir: Utf8PathBuf,
    pub project_file: Option<Utf8PathBuf>,
}

/// Load configuration through every layer, honouring `--config`
pub fn load_config(config_path: Option<&Utf8Path>) -> Result<LoadedConfig> {
    let loader = HierarchicalConfigLoader::new()
        .context("Failed to initialise configuration loader")?
        .with_project_file(config_path);

    let project_file = loader.project_config_path()?;
    let config = loader
        .load()
        .context("Failed to load realmsync configuration")?;

    Ok(LoadedConfig {
        config,
        working_dir: loader.working_dir().to_path_buf(),
        project_file,
    })
}
