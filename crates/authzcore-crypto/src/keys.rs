//! Ed25519 signing keys and X25519 key-exchange keys.

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKeyInner, StaticSecret};

use crate::error::{CryptoError, CryptoResult};

/// An Ed25519 public key, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn verifying_key(&self) -> CryptoResult<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))
    }
}

impl TryFrom<String> for Ed25519PublicKey {
    type Error = CryptoError;

    fn try_from(s: String) -> CryptoResult<Self> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyFormat("expected 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl From<Ed25519PublicKey> for String {
    fn from(k: Ed25519PublicKey) -> String {
        k.to_hex()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

/// A detached Ed25519 signature, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<String> for Ed25519Signature {
    type Error = CryptoError;

    fn try_from(s: String) -> CryptoResult<Self> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(arr))
    }
}

impl From<Ed25519Signature> for String {
    fn from(s: Ed25519Signature) -> String {
        s.to_hex()
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({}...)", &self.to_hex()[..16])
    }
}

/// An Ed25519 signing keypair used to issue and attenuate capabilities.
#[derive(Serialize, Deserialize)]
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The raw 32-byte secret scalar, for callers that need to persist or
    /// re-derive this keypair across process restarts (e.g. the CLI's
    /// `--issuer-seed`).
    pub fn to_secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig: DalekSignature = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }
}

/// Verify a detached signature against a message and public key.
pub fn verify_signature(
    message: &[u8],
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> CryptoResult<bool> {
    let verifying_key = public_key.verifying_key()?;
    let sig = DalekSignature::from_bytes(&signature.0);
    Ok(verifying_key.verify(message, &sig).is_ok())
}

/// An X25519 keypair used to derive a shared secret with a peer's public key.
#[derive(Serialize, Deserialize)]
pub struct X25519KeyPair {
    secret: StaticSecret,
    public: X25519PublicKeyInner,
}

impl X25519KeyPair {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let secret = StaticSecret::from(bytes);
        let public = X25519PublicKeyInner::from(&secret);
        Self { secret, public }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Derive a 32-byte shared secret with a peer's X25519 public key.
    pub fn diffie_hellman(&self, their_public: &[u8; 32]) -> [u8; 32] {
        let their_key = X25519PublicKeyInner::from(*their_public);
        self.secret.diffie_hellman(&their_key).to_bytes()
    }
}
