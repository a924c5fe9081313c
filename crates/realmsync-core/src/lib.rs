//! # realmsync-core
//!
//! Core library for realmsync providing:
//! - Layered configuration loading (embedded defaults, config files, `REALMSYNC_*` environment)
//! - The shared error type
//! - The strict desired-state document schema consumed by the import pipeline

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{
    DesiredStateDocument, FileType, ImportSettings, RealmsyncConfig, RemoteStateConfig,
    SecureString, SortOrder, VarSubstitution,
};
