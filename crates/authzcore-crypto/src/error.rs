//! Cryptographic error types

use thiserror::Error;

/// Closed set of failures a crypto operation can report.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    #[error("invalid signature format")]
    InvalidSignature,

    #[error("AEAD encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("AEAD decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
