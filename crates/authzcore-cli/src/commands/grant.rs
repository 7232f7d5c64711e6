use std::collections::BTreeMap;

use authzcore_capability::CapabilityManager;
use serde::Serialize;

use super::print_json;

#[derive(Serialize)]
struct GrantOutput {
    capability: authzcore_capability::Capability,
    issuer_seed_hex: String,
    issuer_public_key_hex: String,
}

pub fn run(
    issuer: String,
    subject: String,
    scope: String,
    expires_in: i64,
    delegatable: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = CapabilityManager::new(issuer);
    let capability = manager.grant(subject, scope, BTreeMap::new(), expires_in, delegatable)?;

    let output = GrantOutput {
        issuer_seed_hex: hex::encode(manager.signing_key_secret()),
        issuer_public_key_hex: manager.public_key().to_hex(),
        capability,
    };

    if format == "json" {
        print_json(&output)?;
    } else {
        println!("capability_id:       {}", output.capability.id);
        println!("scope:               {}", output.capability.scope);
        println!("expires_at:          {}", output.capability.expires_at);
        println!("delegatable:         {}", output.capability.delegatable);
        println!("issuer_seed_hex:     {}", output.issuer_seed_hex);
        println!("issuer_public_key:   {}", output.issuer_public_key_hex);
        println!();
        println!("capability JSON (save this to authorize/delegate/revoke later):");
        println!("{}", serde_json::to_string_pretty(&output.capability)?);
    }

    Ok(())
}
