//! SHA-256 digest helpers.

use sha2::{Digest, Sha256};

/// SHA-256 digest of `data`, returned as raw bytes.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 digest of `data`, returned as a lowercase hex string.
pub fn hash_data(data: &[u8]) -> String {
    hex::encode(sha256_bytes(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"Important data to hash";
        assert_eq!(hash_data(data), hash_data(data));
    }

    #[test]
    fn hash_changes_with_input() {
        assert_ne!(hash_data(b"a"), hash_data(b"b"));
    }
}
