//! State command
//!
//! Offline access to managed-state attributes: encode an identifier list
//! into the slots stored on the target, or decode slots copied from it.

use anyhow::{Context, Result};
use camino::Utf8Path;
use realmsync_core::RemoteStateConfig;
use realmsync_state::{ManagedStateRecord, StateCodec, StateKey, StateRepository};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};

use crate::cli::{StateCommands, StateIoArgs};
use crate::commands::load_config;
use crate::output;

pub fn run(cmd: StateCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = load_config(config_path)?;
    let state_config = loaded.config.remote_state;

    if !state_config.enabled {
        output::warning("remote-state.enabled is false; state would not be tracked on import");
    }

    let repository = StateRepository::new(
        StateCodec::new(&state_config).context("Invalid remote-state configuration")?,
    );

    match cmd {
        StateCommands::Encode(args) => {
            let key = state_key(&args, &state_config)?;
            let input = read_input(args.input.as_deref())?;
            let attributes = encode(&repository, key, &input)?;
            println!("{}", serde_json::to_string_pretty(&attributes)?);
        }
        StateCommands::Decode(args) => {
            let key = state_key(&args, &state_config)?;
            let input = read_input(args.input.as_deref())?;
            let identifiers = decode(&repository, &key, &input)?;
            println!("{}", serde_json::to_string_pretty(&identifiers)?);
        }
    }

    Ok(())
}

fn state_key(args: &StateIoArgs, config: &RemoteStateConfig) -> Result<StateKey> {
    let namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| config.namespace.clone());
    StateKey::new(namespace, args.key.clone()).context("Invalid state key")
}

fn read_input(path: Option<&Utf8Path>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read standard input")?;
            Ok(input)
        }
    }
}

/// Identifiers (JSON array) to the attribute map holding their slots
fn encode(
    repository: &StateRepository,
    key: StateKey,
    input: &str,
) -> Result<BTreeMap<String, String>> {
    let identifiers: BTreeSet<String> = serde_json::from_str(input)
        .context("Input must be a JSON array of identifier strings")?;

    let record = ManagedStateRecord::with_identifiers(key, identifiers);
    let mut attributes = BTreeMap::new();
    repository.write(&record, &mut attributes)?;
    Ok(attributes)
}

/// Attribute map (JSON object) to the identifiers stored under `key`
fn decode(
    repository: &StateRepository,
    key: &StateKey,
    input: &str,
) -> Result<BTreeSet<String>> {
    let attributes: BTreeMap<String, String> = serde_json::from_str(input)
        .context("Input must be a JSON object of attribute names to string values")?;

    let record = repository
        .read(key, &attributes)
        .with_context(|| format!("Failed to decode managed state '{}'", key))?;
    Ok(record.identifiers().clone())
}
