use authzcore_capability::{Capability, CapabilityManager};

use super::{decode_seed, print_json, read_json_arg};

pub fn run(
    issuer_seed: String,
    issuer: String,
    capability_path: String,
    tool: String,
    method: String,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed = decode_seed(&issuer_seed)?;
    let manager = CapabilityManager::with_signing_key(
        issuer,
        authzcore_crypto::Ed25519KeyPair::from_secret_bytes(&seed),
        authzcore_capability::DEFAULT_SESSION_CACHE_SIZE,
    );
    let capability: Capability = read_json_arg(&capability_path)?;

    let result = manager.authorize(&capability, &tool, &method);

    if format == "json" {
        print_json(&result)?;
    } else if result.allowed {
        println!("ALLOWED  capability={}  latency_us={}", capability.id, result.latency_us);
    } else {
        println!(
            "DENIED   reason={}  latency_us={}",
            result.denial_reason.unwrap_or("UNKNOWN"),
            result.latency_us
        );
    }

    Ok(())
}
