//! # realmsync-import
//!
//! Discovers desired-state files and turns them into parsed documents.
//!
//! The pipeline resolves configured path patterns, extracts files from
//! directories, archives and plain files, drops excluded files, sorts the
//! rest deterministically, then interpolates, checksums and parses each one.
//!
//! ```no_run
//! use realmsync_core::ImportSettings;
//! use realmsync_import::{EnvProperties, ImportProvider};
//! use std::sync::Arc;
//!
//! let settings = ImportSettings {
//!     path: vec!["realms/".to_string()],
//!     ..ImportSettings::default()
//! };
//! let provider = ImportProvider::new(&settings, "/srv/config", Arc::new(EnvProperties))?;
//! for unit in &provider.get()? {
//!     println!("{} {}", unit.path, unit.checksum);
//! }
//! # Ok::<(), realmsync_import::ImportError>(())
//! ```

pub mod checksum;
pub mod error;
pub mod extractor;
pub mod filters;
pub mod interpolation;
pub mod order;
pub mod parser;
pub mod properties;
pub mod provider;
pub mod resource;

pub use checksum::content_checksum;
pub use error::{ImportError, Result};
pub use extractor::{
    ArchiveExtractor, DirectoryExtractor, ExtractorDispatcher, FileExtractor, FileOrigin,
    SourceExtractor, SourceFile,
};
pub use filters::ExclusionFilter;
pub use interpolation::{Interpolator, SubstitutionError};
pub use order::FileOrder;
pub use parser::{DocumentFormat, DocumentParser};
pub use properties::{
    DotenvProperties, EnvProperties, LayeredProperties, MapProperties, PropertyLookup,
};
pub use provider::{ImportProvider, ImportSet, ImportUnit};
pub use resource::{normalize_lexically, Resource, ResourceResolver};
