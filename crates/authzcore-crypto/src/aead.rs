//! ChaCha20-Poly1305 authenticated encryption over a 32-byte shared secret.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Encrypt `plaintext` under `key`, returning a fresh random 96-bit nonce and
/// the ciphertext (with the Poly1305 tag appended, as the `aead` crate does).
pub fn encrypt_message(plaintext: &[u8], key: &[u8; 32]) -> CryptoResult<([u8; 12], Vec<u8>)> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok((nonce_bytes, ciphertext))
}

/// Decrypt `ciphertext` under `key` and `nonce`. Fails with `CryptoError` on
/// a tampered ciphertext or the wrong key/nonce.
pub fn decrypt_message(ciphertext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = Nonce::from_slice(nonce);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = [7u8; 32];
        let plaintext = b"secret message for Bob!";
        let (nonce, ciphertext) = encrypt_message(plaintext, &key).unwrap();
        let decrypted = decrypt_message(&ciphertext, &key, &nonce).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn wrong_key_fails() {
        let key = [7u8; 32];
        let other_key = [9u8; 32];
        let (nonce, ciphertext) = encrypt_message(b"hello", &key).unwrap();
        assert!(decrypt_message(&ciphertext, &other_key, &nonce).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [1u8; 32];
        let (nonce, mut ciphertext) = encrypt_message(b"hello world", &key).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        assert!(decrypt_message(&ciphertext, &key, &nonce).is_err());
    }
}
