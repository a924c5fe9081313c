//! Parsing of interpolated file content into desired-state documents

use crate::error::{ImportError, Result};
use camino::Utf8Path;
use realmsync_core::{DesiredStateDocument, FileType};
use serde::Deserialize;
use std::fmt;

/// Concrete syntax of one import file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Yaml => write!(f, "YAML"),
            DocumentFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Stateless document parser
///
/// Construct once at the composition root and pass it by reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Pick the format from the configured file type or the file extension
    ///
    /// Extensions are matched case-sensitively.
    pub fn detect_format(
        &self,
        path: &Utf8Path,
        file_name: Option<&str>,
        file_type: FileType,
    ) -> Result<DocumentFormat> {
        match file_type {
            FileType::Yaml => Ok(DocumentFormat::Yaml),
            FileType::Json => Ok(DocumentFormat::Json),
            FileType::Auto => {
                let extension = file_name.and_then(|name| Utf8Path::new(name).extension());
                match extension {
                    Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
                    Some("json") => Ok(DocumentFormat::Json),
                    Some(other) => Err(ImportError::parse(
                        path,
                        format!("unknown file extension '.{}'", other),
                    )),
                    None => Err(ImportError::parse(path, "file has no extension")),
                }
            }
        }
    }

    /// Parse content; YAML may hold several documents, JSON holds exactly one
    pub fn parse(
        &self,
        path: &Utf8Path,
        format: DocumentFormat,
        content: &str,
    ) -> Result<Vec<DesiredStateDocument>> {
        match format {
            DocumentFormat::Yaml => self.parse_yaml(path, content),
            DocumentFormat::Json => serde_json::from_str(content)
                .map(|document| vec![document])
                .map_err(|e| ImportError::parse(path, e.to_string())),
        }
    }

    fn parse_yaml(&self, path: &Utf8Path, content: &str) -> Result<Vec<DesiredStateDocument>> {
        let mut documents = Vec::new();

        for (index, document) in serde_yaml_ng::Deserializer::from_str(content).enumerate() {
            let value = serde_yaml_ng::Value::deserialize(document)
                .map_err(|e| ImportError::parse(path, e.to_string()))?;

            // `---` followed by nothing
            if value.is_null() {
                continue;
            }

            let parsed: DesiredStateDocument = serde_yaml_ng::from_value(value).map_err(|e| {
                ImportError::parse(path, format!("document {}: {}", index + 1, e))
            })?;
            documents.push(parsed);
        }

        Ok(documents)
    }
}
