//! # realmsync-state
//!
//! Storage of "previously managed" state as size-limited string attributes
//! on a remote target.
//!
//! - [`compact`]: gzip + base64 compaction with content-based detection
//! - [`crypto`]: password-based authenticated encryption
//! - [`chunk`]: spreading one value across numbered slots
//! - [`StateCodec`]: the self-describing encode/decode pipeline
//! - [`StateRepository`]: reading and replacing [`ManagedStateRecord`]s in an attribute map

pub mod chunk;
pub mod codec;
pub mod compact;
pub mod crypto;
pub mod error;
pub mod record;
pub mod repository;

pub use codec::{StateCodec, StateSlot};
pub use crypto::StateCipher;
pub use error::{CodecError, Result};
pub use record::{ManagedStateRecord, StateDelta, StateKey, STATE_KEY_PREFIX};
pub use repository::StateRepository;
