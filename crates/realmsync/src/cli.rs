//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use realmsync_core::FileType;

/// realmsync - Declarative realm configuration import
#[derive(Parser, Debug)]
#[command(name = "realmsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to realmsync.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Discover, interpolate and parse import files
    Import(ImportArgs),

    /// Encode or decode managed-state attributes
    #[command(subcommand)]
    State(StateCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path pattern to import (replaces import.path; repeatable)
    #[arg(short, long = "path", value_name = "PATTERN")]
    pub paths: Vec<String>,

    /// Glob of files to skip (replaces import.exclude; repeatable)
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Parser to use instead of the configured file type
    #[arg(long, value_name = "TYPE")]
    pub file_type: Option<FileType>,

    /// Include files and directories starting with a dot
    #[arg(long)]
    pub hidden_files: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// State commands
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Encode a JSON array of identifiers into attribute slots
    Encode(StateIoArgs),

    /// Decode attribute slots back into identifiers
    Decode(StateIoArgs),
}

#[derive(Args, Debug)]
pub struct StateIoArgs {
    /// Resource category of the record (e.g. roles, clients)
    #[arg(short, long, value_name = "CATEGORY")]
    pub key: String,

    /// Namespace of the record (defaults to remote-state.namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Read input from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<Utf8PathBuf>,
}
