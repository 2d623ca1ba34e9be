//! # Core Identifier Types
//!
//! Fixed-size byte identifiers shared by the registry and key-manager
//! records. All of them:
//!
//! - order by raw bytes (`Ord`), which is the sort key used for node lists
//!   and every ordered map that ends up in consensus state;
//! - display and serialize as lowercase hex, so bincode and TOML encodings
//!   are stable across replicas.

use std::fmt;
use std::str::FromStr;

use hex::{decode as hex_decode, encode as hex_encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Size in bytes of a master-secret or policy checksum (SHA3-256).
pub const CHECKSUM_SIZE: usize = 32;

/// Epoch number as produced by the beacon.
pub type EpochTime = u64;

/// Error returned when parsing a fixed-size identifier from hex.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdParseError {
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid length: expected {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },
}

macro_rules! byte_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn from_bytes(b: [u8; $len]) -> Self { $name(b) }
            pub fn as_bytes(&self) -> &[u8; $len] { &self.0 }
            pub fn to_hex(&self) -> String { hex_encode(self.0) }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, IdParseError> {
                if bytes.len() != $len {
                    return Err(IdParseError::InvalidLength { expected: $len, found: bytes.len() });
                }
                let mut arr = [0u8; $len];
                arr.copy_from_slice(bytes);
                Ok($name(arr))
            }

            pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex_decode(s)?;
                Self::from_slice(&bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.to_hex()).finish()
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::from_hex(s)
            }
        }

        /* serde as hex string */
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where S: Serializer {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<$name, D::Error>
            where D: Deserializer<'de> {
                let s = String::deserialize(deserializer)?;
                $name::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

byte_id!(
    /// Ed25519 public key. Identifies nodes and entities, and doubles as
    /// the RAK (runtime attestation key) and RSK (runtime signing key).
    PublicKey, 32
);

byte_id!(
    /// Runtime namespace identifier.
    RuntimeId, 32
);

byte_id!(
    /// Runtime encryption public key (REK). Secrets published on chain are
    /// encrypted to the REKs of the current committee.
    EncryptionKey, 32
);

byte_id!(
    /// Raw Ed25519 signature.
    Signature, 64
);

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse_and_display() {
        let id = RuntimeId([0xAB; 32]);
        let parsed: RuntimeId = format!("0x{}", id).parse().expect("parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = PublicKey::from_hex("abcd").unwrap_err();
        assert_eq!(err, IdParseError::InvalidLength { expected: 32, found: 2 });
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let mut ids = vec![PublicKey([3; 32]), PublicKey([1; 32]), PublicKey([2; 32])];
        ids.sort();
        assert_eq!(ids, vec![PublicKey([1; 32]), PublicKey([2; 32]), PublicKey([3; 32])]);
    }

    #[test]
    fn test_signature_bincode_is_stable() {
        let sig = Signature([7; 64]);
        let a = bincode::serialize(&sig).expect("encode");
        let b = bincode::serialize(&sig.clone()).expect("encode");
        assert_eq!(a, b);
        let back: Signature = bincode::deserialize(&a).expect("decode");
        assert_eq!(back, sig);
    }
}
