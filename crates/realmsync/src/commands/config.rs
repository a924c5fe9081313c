//! Config command

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::commands::load_config;
use crate::output;

pub fn run(cmd: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, config_path),
    }
}

fn show(args: ConfigShowArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = load_config(config_path)?;

    // Encryption keys serialize as [REDACTED]
    if args.json {
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        return Ok(());
    }

    match &loaded.project_file {
        Some(path) => output::info(&format!("Project config: {}", path)),
        None => output::info("No project config found, using defaults and environment"),
    }
    println!("{}", serde_yaml_ng::to_string(&loaded.config)?);

    Ok(())
}
