//! Error types for the remote state codec
//!
//! A codec error means the stored record is unusable. Callers must not treat
//! it as an empty record.

use thiserror::Error;

/// Result type alias using the codec's error type
pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to compress state: {0}")]
    Compression(String),

    /// Looked like gzip but did not inflate
    #[error("Failed to decompress state: {0}")]
    Decompression(String),

    #[error("Failed to encrypt state: {0}")]
    Encryption(String),

    /// Wrong key, wrong salt or a corrupted envelope
    #[error("Failed to decrypt state: {0}")]
    Decryption(String),

    /// An encrypted value was read without a configured key
    #[error("State value is encrypted but no encryption key is configured")]
    KeyRequired,

    /// Slot suffixes are not contiguous from zero
    #[error("State attribute '{key}' is missing chunk {index}")]
    MissingChunk { key: String, index: usize },

    /// Decoded text is not a managed-state payload
    #[error("Invalid state payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid state codec configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    /// Create a missing chunk error
    pub fn missing_chunk(key: impl Into<String>, index: usize) -> Self {
        Self::MissingChunk {
            key: key.into(),
            index,
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
