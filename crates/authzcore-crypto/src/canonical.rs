//! Deterministic canonical byte encoding for capability signing.
//!
//! Fields go in fixed lexicographic order, integers are big-endian
//! fixed-width, strings are UTF-8 length-prefixed by a 32-bit big-endian
//! count, and maps are sorted by key. The whole encoding is versioned by a
//! leading one-byte tag so a future format change can be detected instead
//! of silently misinterpreted.

use std::collections::BTreeMap;

use crate::error::CryptoResult;

/// Current canonical encoding version. Bump and branch on this byte if the
/// field layout ever changes.
pub const CANONICAL_VERSION: u8 = 0x01;

/// Accumulates a canonical byte string field by field.
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    pub fn new() -> Self {
        Self {
            buf: vec![CANONICAL_VERSION],
        }
    }

    pub fn push_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(if value { 1 } else { 0 });
        self
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        let bytes = value.as_bytes();
        self.buf
            .extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Raw fixed-width bytes (e.g. a 16-byte capability id), no length prefix.
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// A sequence of 16-byte ids, length-prefixed by count.
    pub fn push_id_list(&mut self, ids: &[[u8; 16]]) -> &mut Self {
        self.buf
            .extend_from_slice(&(ids.len() as u32).to_be_bytes());
        for id in ids {
            self.buf.extend_from_slice(id);
        }
        self
    }

    /// A string-keyed map of opaque JSON values, sorted by key. Each entry
    /// is the length-prefixed key followed by the length-prefixed JSON
    /// serialization of the value; `serde_json` serializes object keys in
    /// `BTreeMap` order by default, so nested objects stay deterministic.
    pub fn push_sorted_map(&mut self, map: &BTreeMap<String, serde_json::Value>) -> CryptoResult<&mut Self> {
        self.buf
            .extend_from_slice(&(map.len() as u32).to_be_bytes());
        for (key, value) in map {
            self.push_str(key);
            let encoded = serde_json::to_vec(value)?;
            self.buf
                .extend_from_slice(&(encoded.len() as u32).to_be_bytes());
            self.buf.extend_from_slice(&encoded);
        }
        Ok(self)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_deterministic() {
        let mut map = BTreeMap::new();
        map.insert("paths".to_string(), serde_json::json!(["/data/*"]));

        let build = || {
            let mut enc = CanonicalEncoder::new();
            enc.push_str("did:example:issuer");
            enc.push_u64(1_700_000_000);
            enc.push_bool(true);
            enc.push_sorted_map(&map).unwrap();
            enc.finish()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn different_field_order_changes_bytes() {
        let mut a = CanonicalEncoder::new();
        a.push_str("x");
        a.push_u64(1);
        let a = a.finish();

        let mut b = CanonicalEncoder::new();
        b.push_u64(1);
        b.push_str("x");
        let b = b.finish();

        assert_ne!(a, b);
    }

    #[test]
    fn leading_byte_is_version_tag() {
        let enc = CanonicalEncoder::new();
        assert_eq!(enc.finish(), vec![CANONICAL_VERSION]);
    }

    #[test]
    fn map_key_order_does_not_affect_bytes() {
        let mut m1 = BTreeMap::new();
        m1.insert("b".to_string(), serde_json::json!(2));
        m1.insert("a".to_string(), serde_json::json!(1));

        let mut m2 = BTreeMap::new();
        m2.insert("a".to_string(), serde_json::json!(1));
        m2.insert("b".to_string(), serde_json::json!(2));

        let mut e1 = CanonicalEncoder::new();
        e1.push_sorted_map(&m1).unwrap();

        let mut e2 = CanonicalEncoder::new();
        e2.push_sorted_map(&m2).unwrap();

        assert_eq!(e1.finish(), e2.finish());
    }
}
