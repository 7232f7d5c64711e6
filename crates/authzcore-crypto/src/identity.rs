//! `CryptoIdentity` bundles a signing keypair and an encryption keypair
//! under one short address, mirroring the reference implementation's
//! `Wallet` convenience type. `CapabilityManager` only needs the Ed25519
//! signing half; this is a constructor convenience for callers that also
//! want a ready-made X25519 keypair for encrypted side channels.

use serde::{Deserialize, Serialize};

use crate::keys::{Ed25519KeyPair, Ed25519PublicKey, X25519KeyPair};

#[derive(Serialize, Deserialize)]
pub struct CryptoIdentity {
    pub signing_keys: Ed25519KeyPair,
    pub encryption_keys: X25519KeyPair,
}

impl CryptoIdentity {
    pub fn generate() -> Self {
        Self {
            signing_keys: Ed25519KeyPair::generate(),
            encryption_keys: X25519KeyPair::generate(),
        }
    }

    /// First 16 hex characters of the Ed25519 public key, for log lines and
    /// display purposes.
    pub fn address_short(&self) -> String {
        let full = self.signing_keys.public_key().to_hex();
        full[..16.min(full.len())].to_string()
    }

    pub fn signing_public_key(&self) -> Ed25519PublicKey {
        self.signing_keys.public_key()
    }

    pub fn encryption_public_key(&self) -> [u8; 32] {
        self.encryption_keys.public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_short_is_stable_for_same_identity() {
        let identity = CryptoIdentity::generate();
        assert_eq!(identity.address_short(), identity.address_short());
        assert_eq!(identity.address_short().len(), 16);
    }

    #[test]
    fn serde_roundtrip_preserves_signing_key() {
        let identity = CryptoIdentity::generate();
        let json = serde_json::to_vec(&identity).unwrap();
        let restored: CryptoIdentity = serde_json::from_slice(&json).unwrap();
        assert_eq!(identity.address_short(), restored.address_short());
        assert_eq!(identity.encryption_public_key(), restored.encryption_public_key());
    }
}
