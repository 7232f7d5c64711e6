use std::str::FromStr;

use authzcore_capability::CapabilityManager;
use authzcore_core::CapabilityId;
use serde::Serialize;

use super::{decode_seed, print_json};

#[derive(Serialize)]
struct RevokeOutput {
    capability_id: String,
    revoked: bool,
}

pub fn run(
    issuer_seed: String,
    issuer: String,
    capability_id: String,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed = decode_seed(&issuer_seed)?;
    let manager = CapabilityManager::with_signing_key(
        issuer,
        authzcore_crypto::Ed25519KeyPair::from_secret_bytes(&seed),
        authzcore_capability::DEFAULT_SESSION_CACHE_SIZE,
    );

    let id = CapabilityId::from_str(&capability_id)?;
    manager.revoke(id);

    let output = RevokeOutput {
        capability_id,
        revoked: true,
    };

    if format == "json" {
        print_json(&output)?;
    } else {
        println!(
            "revoked {} (effective only for this process — the core holds no on-disk revocation list)",
            output.capability_id
        );
    }

    Ok(())
}
