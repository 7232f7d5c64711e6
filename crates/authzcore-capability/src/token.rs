//! The capability credential itself. Constructed only by
//! `CapabilityManager::grant` or `::delegate`; everywhere else it is an
//! opaque, signed record.

use std::collections::BTreeMap;

use authzcore_core::CapabilityId;
use authzcore_crypto::{CanonicalEncoder, Ed25519Signature};
use serde::{Deserialize, Serialize};

/// A signed, scoped, time-bounded, delegatable credential.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capability {
    pub id: CapabilityId,
    pub issuer: String,
    pub subject: String,
    pub scope: String,
    pub constraints: BTreeMap<String, serde_json::Value>,
    pub issued_at: u64,
    pub expires_at: u64,
    pub delegatable: bool,
    pub delegation_chain: Vec<CapabilityId>,
    pub signature: Ed25519Signature,
}

impl Capability {
    /// Canonical byte encoding of every field except `signature`, in the
    /// fixed order: id, issuer, subject, scope, constraints, issued_at,
    /// expires_at, delegatable, delegation_chain.
    pub fn canonical_bytes(&self) -> authzcore_crypto::CryptoResult<Vec<u8>> {
        let mut encoder = CanonicalEncoder::new();
        encoder.push_raw(self.id.as_bytes());
        encoder.push_str(&self.issuer);
        encoder.push_str(&self.subject);
        encoder.push_str(&self.scope);
        encoder.push_sorted_map(&self.constraints)?;
        encoder.push_u64(self.issued_at);
        encoder.push_u64(self.expires_at);
        encoder.push_bool(self.delegatable);
        let chain_bytes: Vec<[u8; 16]> = self.delegation_chain.iter().map(|id| *id.as_bytes()).collect();
        encoder.push_id_list(&chain_bytes);
        Ok(encoder.finish())
    }

    pub fn is_root(&self) -> bool {
        self.delegation_chain.is_empty()
    }

    pub fn is_valid_time(&self, now: u64) -> bool {
        self.issued_at <= now && now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authzcore_crypto::Ed25519KeyPair;

    fn sample() -> Capability {
        let kp = Ed25519KeyPair::generate();
        let mut cap = Capability {
            id: CapabilityId::new(),
            issuer: "did:example:issuer".to_string(),
            subject: "did:example:subject".to_string(),
            scope: "tool:fs/method:read".to_string(),
            constraints: BTreeMap::new(),
            issued_at: 1_000,
            expires_at: 2_000,
            delegatable: true,
            delegation_chain: vec![],
            signature: Ed25519Signature([0u8; 64]),
        };
        let bytes = cap.canonical_bytes().unwrap();
        cap.signature = kp.sign(&bytes);
        cap
    }

    #[test]
    fn canonical_bytes_roundtrip_is_stable() {
        let cap = sample();
        assert_eq!(cap.canonical_bytes().unwrap(), cap.canonical_bytes().unwrap());
    }

    #[test]
    fn serde_roundtrip_is_byte_identical() {
        let cap = sample();
        let json = serde_json::to_vec(&cap).unwrap();
        let restored: Capability = serde_json::from_slice(&json).unwrap();
        let reserialized = serde_json::to_vec(&restored).unwrap();
        assert_eq!(json, reserialized);
        assert_eq!(cap, restored);
    }

    #[test]
    fn is_valid_time_window() {
        let cap = sample();
        assert!(!cap.is_valid_time(999));
        assert!(cap.is_valid_time(1_000));
        assert!(cap.is_valid_time(2_000));
        assert!(!cap.is_valid_time(2_001));
    }
}
