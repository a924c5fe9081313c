//! Content checksums for change detection

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the given text
pub fn content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            content_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_one_character_changes_checksum() {
        let a = content_checksum("realm: master\n");
        let b = content_checksum("realm: mastex\n");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, content_checksum("realm: master\n"));
    }
}
