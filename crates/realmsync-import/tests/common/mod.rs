//! Common test utilities for realmsync-import
//!
//! Provides a temporary import workspace with helpers to lay out files and
//! archives and to build a provider rooted at that workspace.

#![allow(dead_code)]

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use flate2::write::GzEncoder;
use flate2::Compression;
use realmsync_core::ImportSettings;
use realmsync_import::{ImportProvider, MapProperties, PropertyLookup};
use std::fs::{self, File};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary directory acting as the import base directory
pub struct ImportFixture {
    _temp: TempDir,
    base: Utf8PathBuf,
}

impl ImportFixture {
    pub fn new() -> Result<Self> {
        // Default temp dir names start with a dot and would count as hidden
        let temp = tempfile::Builder::new().prefix("realmsync-").tempdir()?;
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non UTF-8 temp dir {}", p.display()))?;
        Ok(Self { _temp: temp, base })
    }

    pub fn base(&self) -> &Utf8Path {
        &self.base
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.base.join(relative)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("writing {}", path))?;
        Ok(path)
    }

    pub fn mkdir(&self, relative: &str) -> Result<Utf8PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write a tar archive; gzip-compressed when the name ends in `.tgz` or `.tar.gz`
    pub fn write_archive(&self, relative: &str, entries: &[(&str, &str)]) -> Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;

        if relative.ends_with(".tgz") || relative.ends_with(".tar.gz") {
            let encoder = GzEncoder::new(file, Compression::default());
            let encoder = append_entries(tar::Builder::new(encoder), entries)?;
            encoder.finish()?;
        } else {
            append_entries(tar::Builder::new(file), entries)?;
        }

        Ok(path)
    }

    pub fn provider(&self, settings: &ImportSettings) -> Result<ImportProvider> {
        self.provider_with(settings, Arc::new(MapProperties::new()))
    }

    pub fn provider_with(
        &self,
        settings: &ImportSettings,
        properties: Arc<dyn PropertyLookup>,
    ) -> Result<ImportProvider> {
        Ok(ImportProvider::new(settings, self.base.clone(), properties)?)
    }
}

fn append_entries<W: std::io::Write>(
    mut builder: tar::Builder<W>,
    entries: &[(&str, &str)],
) -> Result<W> {
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
        }
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, content.as_bytes())?;
    }
    Ok(builder.into_inner()?)
}

/// Settings importing the given patterns, everything else default
pub fn settings(paths: &[&str]) -> ImportSettings {
    ImportSettings {
        path: paths.iter().map(|p| p.to_string()).collect(),
        ..ImportSettings::default()
    }
}

pub fn patterns(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
