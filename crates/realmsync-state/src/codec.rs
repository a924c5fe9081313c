//! Self-describing encoding of managed-state payloads
//!
//! Encoding applies, in order: encryption (when a key is configured),
//! compaction (when enabled) and chunking into attribute slots.
//!
//! Decoding inspects the stored text instead of trusting the current
//! configuration, so values written under a different configuration stay
//! readable:
//!
//! 1. numbered slots are joined in ascending order
//! 2. a compacted value is inflated
//! 3. JSON is returned as is
//! 4. an encryption envelope is decrypted when a key is configured
//! 5. anything else is returned unchanged
//!
//! Without a key an envelope is ordinary text, so every string round-trips
//! through a key-less codec. [`StateRepository`](crate::StateRepository)
//! reports such a payload as [`CodecError::KeyRequired`].

use crate::chunk;
use crate::compact;
use crate::crypto::StateCipher;
use crate::error::{CodecError, Result};
use realmsync_core::types::MIN_CHUNK_SIZE;
use realmsync_core::RemoteStateConfig;
use std::collections::BTreeMap;
use tracing::trace;

/// One attribute to write on the remote target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSlot {
    pub key: String,
    pub value: String,
}

/// Managed-state codec; holds no mutable state and is safe to share
#[derive(Debug)]
pub struct StateCodec {
    compact: bool,
    cipher: Option<StateCipher>,
    chunk_size: usize,
}

impl StateCodec {
    pub fn new(config: &RemoteStateConfig) -> Result<Self> {
        if config.chunk_size < MIN_CHUNK_SIZE {
            return Err(CodecError::invalid_config(format!(
                "chunk size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE, config.chunk_size
            )));
        }

        let cipher = match &config.encryption_key {
            Some(key) if !key.is_empty() => Some(StateCipher::new(key, &config.encryption_salt)?),
            _ => None,
        };

        Ok(Self {
            compact: config.compact,
            cipher,
            chunk_size: config.chunk_size,
        })
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn is_encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Encode a payload into one stored value
    pub fn encode(&self, plain: &str) -> Result<String> {
        let mut value = match &self.cipher {
            Some(cipher) => cipher.encrypt(plain)?,
            None => plain.to_string(),
        };

        if self.compact {
            value = compact::compress(&value)?;
        }

        Ok(value)
    }

    /// Encode a payload into numbered slots of `key`
    pub fn encode_slots(&self, key: &str, plain: &str) -> Result<Vec<StateSlot>> {
        let encoded = self.encode(plain)?;
        let slots: Vec<StateSlot> = chunk::split(&encoded, self.chunk_size)
            .into_iter()
            .enumerate()
            .map(|(index, piece)| StateSlot {
                key: chunk::slot_key(key, index),
                value: piece.to_string(),
            })
            .collect();

        trace!("Encoded '{}' into {} slots", key, slots.len());
        Ok(slots)
    }

    /// Decode one stored value
    pub fn decode(&self, stored: &str) -> Result<String> {
        let text = compact::decompress(stored)?;

        if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
            return Ok(text);
        }

        match &self.cipher {
            Some(cipher) if StateCipher::is_envelope(&text) => cipher.decrypt(&text),
            _ => Ok(text),
        }
    }

    /// Join and decode the slots of `key`; `None` when nothing is stored
    pub fn decode_slots(
        &self,
        key: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Option<String>> {
        match chunk::join_slots(key, attributes)? {
            Some(joined) => self.decode(&joined).map(Some),
            None => Ok(None),
        }
    }
}
