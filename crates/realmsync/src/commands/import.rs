//! Import command
//!
//! Composition root of the import pipeline: configuration, CLI overrides and
//! property sources are wired into an [`ImportProvider`] here.

use anyhow::{Context, Result};
use camino::Utf8Path;
use realmsync_core::ImportSettings;
use realmsync_import::{
    DotenvProperties, EnvProperties, ImportProvider, ImportSet, LayeredProperties,
};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::ImportArgs;
use crate::commands::load_config;
use crate::output;

/// Properties file read from the working directory when present
const DOTENV_FILE: &str = ".env";

/// Per-file result printed by the command
#[derive(Debug, Serialize)]
struct ImportSummary {
    path: String,
    checksum: String,
    realms: Vec<String>,
}

pub fn run(args: ImportArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = load_config(config_path)?;
    let mut settings = loaded.config.import;
    apply_overrides(&mut settings, &args);

    let properties = build_properties(&loaded.working_dir)?;
    let provider = ImportProvider::new(&settings, loaded.working_dir, Arc::new(properties))
        .context("Failed to set up import pipeline")?;

    let imported = provider.get().context("Import failed")?;
    let summaries = summarize(&imported);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    output::header("Import files");
    for summary in &summaries {
        println!("{}", summary.path);
        output::kv("checksum", &summary.checksum);
        output::kv("realms", &summary.realms.join(", "));
    }
    output::success(&format!(
        "{} files, {} documents",
        imported.len(),
        imported.documents().count()
    ));

    Ok(())
}

/// CLI flags are the highest configuration layer
fn apply_overrides(settings: &mut ImportSettings, args: &ImportArgs) {
    if !args.paths.is_empty() {
        settings.path = args.paths.clone();
    }
    if !args.excludes.is_empty() {
        settings.exclude = args.excludes.clone();
    }
    if let Some(file_type) = args.file_type {
        settings.file_type = file_type;
    }
    if args.hidden_files {
        settings.hidden_files = true;
    }
}

/// Process environment first, then `.env` of the working directory
fn build_properties(working_dir: &Utf8Path) -> Result<LayeredProperties> {
    let mut properties = LayeredProperties::new().push(Arc::new(EnvProperties));

    let dotenv = working_dir.join(DOTENV_FILE);
    if dotenv.is_file() {
        let file = DotenvProperties::from_path(&dotenv)
            .with_context(|| format!("Failed to read {}", dotenv))?;
        properties = properties.push(Arc::new(file));
    }

    Ok(properties)
}

fn summarize(imported: &ImportSet) -> Vec<ImportSummary> {
    imported
        .iter()
        .map(|unit| ImportSummary {
            path: unit.path.to_string(),
            checksum: unit.checksum.clone(),
            realms: unit.documents.iter().map(|doc| doc.realm.clone()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use realmsync_core::FileType;
    use realmsync_import::PropertyLookup;
    use std::fs;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::Builder::new()
            .prefix("realmsync-")
            .tempdir()
            .unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, root)
    }

    fn args() -> ImportArgs {
        ImportArgs {
            paths: Vec::new(),
            excludes: Vec::new(),
            file_type: None,
            hidden_files: false,
            json: false,
        }
    }

    #[test]
    fn test_overrides_replace_configured_values() {
        let mut settings = ImportSettings {
            path: vec!["configured/".to_string()],
            exclude: vec!["*.bak".to_string()],
            ..ImportSettings::default()
        };
        let args = ImportArgs {
            paths: vec!["cli/".to_string()],
            file_type: Some(FileType::Yaml),
            ..args()
        };

        apply_overrides(&mut settings, &args);
        assert_eq!(settings.path, vec!["cli/".to_string()]);
        assert_eq!(settings.exclude, vec!["*.bak".to_string()]);
        assert_eq!(settings.file_type, FileType::Yaml);
        assert!(!settings.hidden_files);
    }

    #[test]
    fn test_dotenv_is_lower_precedence_than_environment() {
        let (_temp, root) = temp_root();
        fs::write(
            root.join(".env"),
            "REALMSYNC_TEST_ONLY_IN_DOTENV=from-file\nPATH=from-file\n",
        )
        .unwrap();

        let properties = build_properties(&root).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(
            properties.lookup("REALMSYNC_TEST_ONLY_IN_DOTENV").as_deref(),
            Some("from-file")
        );
        assert_ne!(properties.lookup("PATH").as_deref(), Some("from-file"));
    }

    #[test]
    fn test_summaries_follow_import_order() {
        let (_temp, root) = temp_root();
        fs::create_dir_all(root.join("realms")).unwrap();
        fs::write(root.join("realms/b.yaml"), "realm: beta\n").unwrap();
        fs::write(
            root.join("realms/a.yaml"),
            "realm: alpha\n---\nrealm: alpha-two\n",
        )
        .unwrap();

        let settings = ImportSettings {
            path: vec!["realms/".to_string()],
            ..ImportSettings::default()
        };
        let provider =
            ImportProvider::new(&settings, root.clone(), Arc::new(EnvProperties)).unwrap();
        let summaries = summarize(&provider.get().unwrap());

        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].path.ends_with("a.yaml"));
        assert_eq!(summaries[0].realms, vec!["alpha", "alpha-two"]);
        assert_eq!(summaries[1].realms, vec!["beta"]);
        assert_eq!(summaries[0].checksum.len(), 64);
    }
}
