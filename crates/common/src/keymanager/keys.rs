//! Attestation and encryption key extraction per TEE hardware class.
//!
//! Key managers without a TEE use fixed, publicly derivable placeholder
//! keys. Their "secrets" are therefore not secret at all, which is what
//! `Status::is_secure == false` advertises.

use ed25519_dalek::SigningKey;

use super::error::{KeyManagerError, Result};
use crate::crypto::{public_key_of, sha3_256, signing_key_from_seed};
use crate::registry::{Capabilities, TeeHardware};
use crate::types::{EncryptionKey, PublicKey};

const INSECURE_RAK_SEED: &[u8] = b"keyward: insecure key manager RAK seed";
const INSECURE_REK_SEED: &[u8] = b"keyward: insecure key manager REK seed";

/// Signing key behind [`insecure_rak`]. Public by construction.
pub fn insecure_rak_signer() -> SigningKey {
    signing_key_from_seed(INSECURE_RAK_SEED)
}

/// Attestation key used by key managers that run without a TEE.
pub fn insecure_rak() -> PublicKey {
    public_key_of(&insecure_rak_signer())
}

/// Encryption key used by key managers that run without a TEE.
pub fn insecure_rek() -> EncryptionKey {
    EncryptionKey(sha3_256(INSECURE_REK_SEED))
}

impl TeeHardware {
    /// Trusted attestation key for a node entry, given the runtime's
    /// required class `self`.
    pub fn attestation_key(&self, node_id: &PublicKey, capabilities: &Capabilities) -> Result<PublicKey> {
        match self {
            TeeHardware::None => Ok(insecure_rak()),
            TeeHardware::IntelSgx => capabilities
                .tee
                .as_ref()
                .map(|tee| tee.rak)
                .ok_or(KeyManagerError::MissingTeeCapability(*node_id)),
            TeeHardware::Reserved => Err(KeyManagerError::HardwareMismatch {
                required: *self,
                actual: capabilities.hardware(),
            }),
        }
    }

    /// Encryption key for a node entry, given the runtime's required class
    /// `self`. `None` when the node cannot be targeted.
    pub fn encryption_key(&self, capabilities: &Capabilities) -> Option<EncryptionKey> {
        match self {
            TeeHardware::None => Some(insecure_rek()),
            TeeHardware::IntelSgx => capabilities.tee.as_ref().and_then(|tee| tee.rek),
            TeeHardware::Reserved => None,
        }
    }
}
