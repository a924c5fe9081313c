//! Configuration loading and management

mod hierarchical_loader;
mod loader;

pub use hierarchical_loader::HierarchicalConfigLoader;
pub use loader::{find_project_config, merge_yaml, read_yaml_layer, CONFIG_FILE_NAMES};
