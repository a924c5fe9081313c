//! Type definitions shared across realmsync crates

mod config_types;
mod document;
mod secret;

pub use config_types::*;
pub use document::DesiredStateDocument;
pub use secret::SecureString;
