//! Password-based encryption of state values
//!
//! The key is derived with Argon2id from the configured password, using the
//! SHA-256 digest of the configured salt as Argon2 salt. Values are sealed
//! with ChaCha20-Poly1305 under a random 96-bit nonce and stored as
//!
//! ```text
//! enc:v1:<base64(nonce || ciphertext)>
//! ```
//!
//! The prefix contains characters outside the base64 alphabet, so an
//! envelope is never mistaken for a compacted value.

use crate::error::{CodecError, Result};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use realmsync_core::SecureString;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Prefix marking an encrypted value
pub const ENVELOPE_PREFIX: &str = "enc:v1:";

/// Size of the derived key in bytes (256 bits)
const KEY_SIZE: usize = 32;

/// Size of the nonce in bytes (96 bits for ChaCha20-Poly1305)
const NONCE_SIZE: usize = 12;

/// Size of the Poly1305 tag in bytes
const TAG_SIZE: usize = 16;

/// Symmetric cipher for state values
pub struct StateCipher {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl StateCipher {
    /// Derive the key from a password and salt
    pub fn new(password: &SecureString, salt: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(CodecError::invalid_config("encryption key must not be empty"));
        }

        let salt_digest = Sha256::digest(salt.as_bytes());
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        Argon2::default()
            .hash_password_into(
                password.expose().as_bytes(),
                salt_digest.as_slice(),
                key.as_mut(),
            )
            .map_err(|e| CodecError::invalid_config(format!("key derivation failed: {}", e)))?;

        Ok(Self { key })
    }

    /// Whether the value carries the envelope prefix
    pub fn is_envelope(value: &str) -> bool {
        value.starts_with(ENVELOPE_PREFIX)
    }

    pub fn encrypt(&self, plain: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, plain.as_bytes())
            .map_err(|e| CodecError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", ENVELOPE_PREFIX, BASE64.encode(payload)))
    }

    pub fn decrypt(&self, value: &str) -> Result<String> {
        let encoded = value
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| CodecError::Decryption("value is not an encrypted envelope".into()))?;

        let payload = BASE64
            .decode(encoded)
            .map_err(|e| CodecError::Decryption(format!("invalid envelope encoding: {}", e)))?;
        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CodecError::Decryption("envelope is truncated".into()));
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
        let plain = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                CodecError::Decryption("authentication failed (wrong key or corrupted value)".into())
            })?;

        String::from_utf8(plain)
            .map_err(|e| CodecError::Decryption(format!("decrypted value is not UTF-8: {}", e)))
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.key.as_ref()))
    }
}

impl fmt::Debug for StateCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateCipher([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(password: &str, salt: &str) -> StateCipher {
        StateCipher::new(&SecureString::new(password), salt).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = cipher("password", "salt");
        let sealed = cipher.encrypt("[\"role1\"]").unwrap();

        assert!(StateCipher::is_envelope(&sealed));
        assert!(!sealed.contains("role1"));
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "[\"role1\"]");
    }

    #[test]
    fn test_nonce_is_random() {
        let cipher = cipher("password", "salt");
        assert_ne!(cipher.encrypt("x").unwrap(), cipher.encrypt("x").unwrap());
    }

    #[test]
    fn test_wrong_key_or_salt_fails() {
        let sealed = cipher("password", "salt").encrypt("secret").unwrap();

        assert!(matches!(
            cipher("other", "salt").decrypt(&sealed),
            Err(CodecError::Decryption(_))
        ));
        assert!(matches!(
            cipher("password", "pepper").decrypt(&sealed),
            Err(CodecError::Decryption(_))
        ));
    }

    #[test]
    fn test_tampered_envelope_fails() {
        let cipher = cipher("password", "salt");
        let sealed = cipher.encrypt("secret").unwrap();
        let mut payload = BASE64.decode(&sealed[ENVELOPE_PREFIX.len()..]).unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x01;
        let tampered = format!("{}{}", ENVELOPE_PREFIX, BASE64.encode(payload));

        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(CodecError::Decryption(_))
        ));
        assert!(matches!(
            cipher.decrypt("enc:v1:AAAA"),
            Err(CodecError::Decryption(_))
        ));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            StateCipher::new(&SecureString::new(""), "salt"),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        assert_eq!(format!("{:?}", cipher("pw", "s")), "StateCipher([REDACTED])");
    }
}
