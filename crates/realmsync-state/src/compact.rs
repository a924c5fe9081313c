//! Compaction: gzip wrapped in standard base64
//!
//! Detection never trusts configuration. A value counts as compressed only
//! when it is non-empty base64 whose decoded bytes are longer than two bytes
//! and start with the gzip magic number.

use crate::error::{CodecError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gzip the text and encode the stream as base64
pub fn compress(text: &str) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    let bytes = encoder
        .finish()
        .map_err(|e| CodecError::Compression(e.to_string()))?;

    Ok(BASE64.encode(bytes))
}

/// Whether the value is a compacted (gzip + base64) payload
pub fn is_compressed(value: &str) -> bool {
    gzip_bytes(value).is_some()
}

/// Inflate a compacted value; anything else is returned unchanged
pub fn decompress(value: &str) -> Result<String> {
    let Some(bytes) = gzip_bytes(value) else {
        return Ok(value.to_string());
    };

    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| CodecError::Decompression(e.to_string()))?;

    Ok(text)
}

fn gzip_bytes(value: &str) -> Option<Vec<u8>> {
    if value.is_empty() {
        return None;
    }

    let bytes = BASE64.decode(value).ok()?;
    (bytes.len() > 2 && bytes[..2] == GZIP_MAGIC).then_some(bytes)
}
