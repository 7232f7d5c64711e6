use authzcore_capability::{Capability, CapabilityManager};
use serde::Serialize;

use super::{decode_seed, print_json, read_json_arg};

#[derive(Serialize)]
struct DelegateOutput {
    capability: Capability,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    issuer_seed: String,
    issuer: String,
    parent_path: String,
    new_subject: String,
    narrowed_scope: String,
    expires_in: Option<i64>,
    delegatable: Option<bool>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed = decode_seed(&issuer_seed)?;
    let manager = CapabilityManager::with_signing_key(
        issuer,
        authzcore_crypto::Ed25519KeyPair::from_secret_bytes(&seed),
        authzcore_capability::DEFAULT_SESSION_CACHE_SIZE,
    );
    let parent: Capability = read_json_arg(&parent_path)?;

    let child = manager.delegate(&parent, new_subject, narrowed_scope, expires_in, delegatable)?;
    let output = DelegateOutput { capability: child };

    if format == "json" {
        print_json(&output)?;
    } else {
        println!("capability_id: {}", output.capability.id);
        println!("scope:         {}", output.capability.scope);
        println!("delegatable:   {}", output.capability.delegatable);
        println!();
        println!("{}", serde_json::to_string_pretty(&output.capability)?);
    }

    Ok(())
}
