//! Configuration file discovery and YAML layer merging

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::{Mapping, Value};
use std::fs;

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["realmsync.yaml", "realmsync.yml"];

/// Find a project configuration file in `start` or its parent directories
pub fn find_project_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Some(path);
            }
        }
        current = dir.parent();
    }

    None
}

/// Read one configuration layer as an untyped YAML value
///
/// An empty file is an empty layer.
pub fn read_yaml_layer(path: &Utf8Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config_not_found(path.as_str())
        } else {
            Error::Io(e)
        }
    })?;

    let value: Value = serde_yaml_ng::from_str(&content)
        .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(Error::invalid_config(format!(
            "{} must contain a mapping at the top level",
            path
        ))),
    }
}

/// Deep-merge `overlay` into `base`
///
/// Mappings merge key by key; every other value (including sequences) in the
/// overlay replaces the base value.
pub fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
