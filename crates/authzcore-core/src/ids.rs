//! Random 128-bit identifiers used for capabilities and sessions.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IdParseError {
    #[error("expected 32 hex characters, got {0}")]
    WrongLength(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

macro_rules! random_hex_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; 16]);

        impl $name {
            pub fn new() -> Self {
                let mut bytes = [0u8; 16];
                rand::thread_rng().fill_bytes(&mut bytes);
                Self(bytes)
            }

            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let decoded = hex::decode(s)?;
                if decoded.len() != 16 {
                    return Err(IdParseError::WrongLength(decoded.len()));
                }
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&decoded);
                Ok(Self(bytes))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_hex()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }
    };
}

random_hex_id!(CapabilityId);
random_hex_id!(SessionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_id_roundtrips_through_hex() {
        let id = CapabilityId::new();
        let hex = id.to_hex();
        let parsed: CapabilityId = hex.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn session_ids_are_not_reused() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("abcd".parse::<CapabilityId>().is_err());
    }
}
