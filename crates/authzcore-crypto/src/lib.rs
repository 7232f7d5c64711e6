//! Authzcore Crypto - cryptographic primitives for the authorization core
//!
//! This crate provides:
//! - Ed25519 key generation, signing, and verification
//! - X25519 key exchange
//! - ChaCha20-Poly1305 authenticated encryption
//! - SHA-256 hashing
//! - Deterministic canonical encoding for capability signing
//! - Batch signature verification with an LRU verification cache

pub mod aead;
pub mod batch;
pub mod canonical;
pub mod error;
pub mod hash;
pub mod identity;
pub mod keys;

pub use aead::*;
pub use batch::*;
pub use canonical::*;
pub use error::*;
pub use hash::*;
pub use identity::*;
pub use keys::*;
