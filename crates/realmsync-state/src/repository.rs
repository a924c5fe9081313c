//! Reading and writing records as remote string attributes
//!
//! The attribute map stands in for the attribute bag of the remote scope
//! (for example a realm). Callers load it, let the repository read or
//! replace one record, and persist the map afterwards.

use crate::chunk;
use crate::codec::StateCodec;
use crate::crypto::StateCipher;
use crate::error::{CodecError, Result};
use crate::record::{ManagedStateRecord, StateKey};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug)]
pub struct StateRepository {
    codec: StateCodec,
}

impl StateRepository {
    pub fn new(codec: StateCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    /// Read a record; an absent record is empty, an unreadable one is an error
    ///
    /// An encrypted record read without a configured key is [`CodecError::KeyRequired`].
    pub fn read(
        &self,
        key: &StateKey,
        attributes: &BTreeMap<String, String>,
    ) -> Result<ManagedStateRecord> {
        let attribute = key.attribute_key();

        match self.codec.decode_slots(&attribute, attributes)? {
            Some(payload) if StateCipher::is_envelope(&payload) && !self.codec.is_encrypting() => {
                Err(CodecError::KeyRequired)
            }
            Some(payload) => ManagedStateRecord::from_payload(key.clone(), &payload),
            None => {
                debug!("No managed state stored under '{}'", attribute);
                Ok(ManagedStateRecord::new(key.clone()))
            }
        }
    }

    /// Replace every slot of the record's key; returns the number of slots written
    ///
    /// Encoding happens before the map is touched, so a failure leaves it unchanged.
    pub fn write(
        &self,
        record: &ManagedStateRecord,
        attributes: &mut BTreeMap<String, String>,
    ) -> Result<usize> {
        let attribute = record.key().attribute_key();
        let payload = record.to_payload()?;
        let slots = self.codec.encode_slots(&attribute, &payload)?;

        attributes.retain(|name, _| !chunk::is_slot_of(&attribute, name));
        let written = slots.len();
        for slot in slots {
            attributes.insert(slot.key, slot.value);
        }

        debug!(
            "Stored {} managed identifiers under '{}' in {} slots",
            record.len(),
            attribute,
            written
        );
        Ok(written)
    }
}
