//! Configuration types for the import pipeline and the remote state codec
//!
//! These types mirror `realmsync.yaml`. Every field has a default so that a
//! configuration file only needs to name the values it changes.

use crate::error::{Error, Result};
use crate::types::SecureString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest chunk size that still guarantees progress when cutting on UTF-8 boundaries
pub const MIN_CHUNK_SIZE: usize = 4;

/// Complete realmsync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealmsyncConfig {
    /// Import source discovery and parsing
    #[serde(default)]
    pub import: ImportSettings,

    /// Remote managed-state storage
    #[serde(default)]
    pub remote_state: RemoteStateConfig,
}

impl RealmsyncConfig {
    /// Reject settings that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        self.import.var_substitution.validate()?;

        if self.remote_state.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::invalid_config(format!(
                "remote-state chunk-size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE, self.remote_state.chunk_size
            )));
        }

        Ok(())
    }
}

/// Import source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImportSettings {
    /// Ordered path patterns (bare paths, `file:` URLs, globs)
    #[serde(default)]
    pub path: Vec<String>,

    /// Glob patterns of files to drop after discovery
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Include files and directories whose name starts with a dot
    #[serde(default)]
    pub hidden_files: bool,

    /// Parser selection
    #[serde(default)]
    pub file_type: FileType,

    /// Ordering of discovered files
    #[serde(default)]
    pub sort: SortOrder,

    /// Variable interpolation
    #[serde(default)]
    pub var_substitution: VarSubstitution,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            exclude: Vec::new(),
            hidden_files: false,
            file_type: FileType::default(),
            sort: SortOrder::default(),
            var_substitution: VarSubstitution::default(),
        }
    }
}

/// How import files are parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    /// Dispatch on the file extension
    #[default]
    Auto,
    Yaml,
    Json,
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(Error::invalid_config(format!(
                "Unknown file type: {}. Valid file types: auto, yaml, json",
                other
            ))),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Auto => write!(f, "auto"),
            FileType::Yaml => write!(f, "yaml"),
            FileType::Json => write!(f, "json"),
        }
    }
}

/// Ordering applied to discovered import files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Absolute path, byte-wise
    #[default]
    Path,
    /// File name first, absolute path as tie breaker
    FileName,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(Self::Path),
            "file-name" | "filename" => Ok(Self::FileName),
            other => Err(Error::invalid_config(format!(
                "Unknown sort order: {}. Valid sort orders: path, file-name",
                other
            ))),
        }
    }
}

/// Variable interpolation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VarSubstitution {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_var_prefix")]
    pub prefix: String,

    #[serde(default = "default_var_suffix")]
    pub suffix: String,

    /// Substitute tokens nested inside variable names, e.g. `${db_${env}}`
    #[serde(default)]
    pub in_variables: bool,

    /// Fail on undefined variables instead of leaving the token in place
    #[serde(default = "default_true")]
    pub undefined_is_error: bool,
}

impl VarSubstitution {
    /// Reject delimiters that can never open or close a token
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() || self.suffix.is_empty() {
            return Err(Error::invalid_config(
                "var-substitution prefix and suffix must not be empty",
            ));
        }

        // Nested names are scanned for the prefix before the suffix
        if self.in_variables && self.suffix.starts_with(&self.prefix) {
            return Err(Error::invalid_config(format!(
                "var-substitution suffix '{}' must not start with the prefix '{}' when in-variables is enabled",
                self.suffix, self.prefix
            )));
        }

        Ok(())
    }
}

impl Default for VarSubstitution {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: default_var_prefix(),
            suffix: default_var_suffix(),
            in_variables: false,
            undefined_is_error: true,
        }
    }
}

/// Remote managed-state settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteStateConfig {
    /// Track managed identifiers on the target
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// gzip + base64 the stored value
    #[serde(default)]
    pub compact: bool,

    /// Password for state encryption; unencrypted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<SecureString>,

    #[serde(default = "default_encryption_salt")]
    pub encryption_salt: String,

    /// Maximum length in bytes of one stored attribute value
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Namespace segment of the state attribute key
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for RemoteStateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            compact: false,
            encryption_key: None,
            encryption_salt: default_encryption_salt(),
            chunk_size: default_chunk_size(),
            namespace: default_namespace(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_var_prefix() -> String {
    "${".to_string()
}
fn default_var_suffix() -> String {
    "}".to_string()
}
fn default_encryption_salt() -> String {
    "2B521C795FBE2F2425DB150CD3700BA9".to_string()
}
fn default_chunk_size() -> usize {
    250
}
fn default_namespace() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RealmsyncConfig::default();
        assert!(config.import.path.is_empty());
        assert_eq!(config.import.file_type, FileType::Auto);
        assert_eq!(config.import.sort, SortOrder::Path);
        assert_eq!(config.import.var_substitution.prefix, "${");
        assert!(config.import.var_substitution.undefined_is_error);
        assert!(config.remote_state.enabled);
        assert_eq!(config.remote_state.chunk_size, 250);
        assert!(config.remote_state.encryption_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
import:
  path:
    - realms/
  file-type: json
remote-state:
  compact: true
  encryption-key: secret
"#;
        let config: RealmsyncConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.import.path, vec!["realms/".to_string()]);
        assert_eq!(config.import.file_type, FileType::Json);
        assert!(!config.import.hidden_files);
        assert!(config.remote_state.compact);
        assert_eq!(
            config.remote_state.encryption_key.as_ref().map(|k| k.expose()),
            Some("secret")
        );
        assert_eq!(config.remote_state.namespace, "default");
    }

    #[test]
    fn test_validate_rejects_tiny_chunks() {
        let mut config = RealmsyncConfig::default();
        config.remote_state.chunk_size = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut config = RealmsyncConfig::default();
        config.import.var_substitution.prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_closing_nested_delimiters() {
        let mut config = RealmsyncConfig::default();
        config.import.var_substitution.prefix = "%".to_string();
        config.import.var_substitution.suffix = "%".to_string();
        assert!(config.validate().is_ok());

        config.import.var_substitution.in_variables = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("YAML".parse::<FileType>().unwrap(), FileType::Yaml);
        assert_eq!("file-name".parse::<SortOrder>().unwrap(), SortOrder::FileName);
        assert!("xml".parse::<FileType>().is_err());
    }

    #[test]
    fn test_serialized_config_redacts_key() {
        let mut config = RealmsyncConfig::default();
        config.remote_state.encryption_key = Some(SecureString::from("password"));
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(yaml.contains("[REDACTED]"));
        assert!(!yaml.contains("password"));
    }
}
