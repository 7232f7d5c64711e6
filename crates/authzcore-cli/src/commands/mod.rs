pub mod authorize;
pub mod delegate;
pub mod grant;
pub mod revoke;
pub mod serve;

use std::io::Read;

/// Read a JSON-encoded value from a file path, or from stdin when `path` is `"-"`.
pub fn read_json_arg<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Decode a hex-encoded 32-byte issuer seed, as printed by `grant`.
pub fn decode_seed(hex_str: &str) -> Result<[u8; 32], Box<dyn std::error::Error>> {
    let bytes = hex::decode(hex_str)?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| "issuer seed must be 32 bytes (64 hex characters)")?;
    Ok(arr)
}

/// Print a value as pretty JSON, regardless of `--format` — the `plain`
/// format still prints the full structured result for these commands since
/// a capability or authorization decision has no shorter faithful rendering.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
