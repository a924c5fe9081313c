//! Spreading one stored value across size-limited attribute slots
//!
//! Slots are named `<key>-0`, `<key>-1`, ... A value that fits in one slot is
//! still written as `<key>-0`. A bare `<key>` attribute is accepted on read
//! when no numbered slot exists.

use crate::error::{CodecError, Result};
use realmsync_core::types::MIN_CHUNK_SIZE;
use std::collections::BTreeMap;

/// Name of slot `index` of `key`
pub fn slot_key(key: &str, index: usize) -> String {
    format!("{}-{}", key, index)
}

/// Slot index of `name` when it is a numbered slot of `key`
///
/// Leading zeros and signs are rejected so every index has one spelling.
pub fn slot_index(key: &str, name: &str) -> Option<usize> {
    let suffix = name.strip_prefix(key)?.strip_prefix('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if suffix.len() > 1 && suffix.starts_with('0') {
        return None;
    }
    suffix.parse().ok()
}

/// Whether `name` is the bare key or one of its numbered slots
pub fn is_slot_of(key: &str, name: &str) -> bool {
    name == key || slot_index(key, name).is_some()
}

/// Cut a value into pieces of at most `chunk_size` bytes
///
/// Pieces end on UTF-8 character boundaries, so for ASCII payloads every
/// piece but the last is exactly `chunk_size` bytes. An empty value yields a
/// single empty piece.
pub fn split(value: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(MIN_CHUNK_SIZE);
    let mut pieces = Vec::with_capacity(value.len() / chunk_size + 1);
    let mut rest = value;

    while rest.len() > chunk_size {
        let mut end = chunk_size;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        pieces.push(head);
        rest = tail;
    }

    pieces.push(rest);
    pieces
}

/// Reassemble the value stored under `key`, if any
///
/// Numbered slots are concatenated in ascending order and must be contiguous
/// from zero. Without numbered slots the bare key is used.
pub fn join_slots(key: &str, attributes: &BTreeMap<String, String>) -> Result<Option<String>> {
    let slots: BTreeMap<usize, &String> = attributes
        .iter()
        .filter_map(|(name, value)| slot_index(key, name).map(|index| (index, value)))
        .collect();

    if slots.is_empty() {
        return Ok(attributes.get(key).cloned());
    }

    let mut joined = String::new();
    for (expected, (index, value)) in slots.into_iter().enumerate() {
        if index != expected {
            return Err(CodecError::missing_chunk(key, expected));
        }
        joined.push_str(value);
    }

    Ok(Some(joined))
}
