//! Key-manager enclave initialization response.
//!
//! Each key-manager node embeds a `SignedInitResponse` (bincode) in the
//! `extra_info` of its runtime entry. It states which policy, checksum and
//! RSK the enclave runs with, and which next checksum and next RSK it is
//! ready to switch to.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use super::error::{KeyManagerError, Result};
use crate::crypto::{sign, verify};
use crate::types::{PublicKey, Signature};

/// Signature context for initialization responses.
pub const INIT_RESPONSE_SIGNATURE_CONTEXT: &[u8] = b"keyward/keymanager: init response";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    pub is_secure: bool,
    pub checksum: Vec<u8>,
    pub next_checksum: Vec<u8>,
    pub policy_checksum: Vec<u8>,
    pub rsk: Option<PublicKey>,
    pub next_rsk: Option<PublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInitResponse {
    pub init_response: InitResponse,
    pub signature: Signature,
}

impl SignedInitResponse {
    pub fn sign(init_response: InitResponse, rak: &SigningKey) -> Result<Self> {
        let signature = sign(rak, INIT_RESPONSE_SIGNATURE_CONTEXT, &init_response)?;
        Ok(SignedInitResponse { init_response, signature })
    }

    pub fn verify(&self, rak: &PublicKey) -> Result<()> {
        verify(rak, INIT_RESPONSE_SIGNATURE_CONTEXT, &self.init_response, &self.signature)?;
        Ok(())
    }

    /// Encode for `NodeRuntime::extra_info`.
    pub fn to_extra_info(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| KeyManagerError::verification(e))
    }

    /// Decode from `NodeRuntime::extra_info`. The result is untrusted until
    /// [`verify`](Self::verify) succeeds.
    pub fn from_extra_info(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| KeyManagerError::verification(format!("malformed init response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{public_key_of, signing_key_from_seed};

    #[test]
    fn test_extra_info_roundtrip_and_verify() {
        let rak = signing_key_from_seed(b"node rak");
        let resp = InitResponse { is_secure: true, checksum: vec![1; 32], ..Default::default() };
        let signed = SignedInitResponse::sign(resp.clone(), &rak).expect("sign");
        let bytes = signed.to_extra_info().expect("encode");

        let back = SignedInitResponse::from_extra_info(&bytes).expect("decode");
        assert_eq!(back.init_response, resp);
        assert_eq!(back.verify(&public_key_of(&rak)), Ok(()));
        assert!(back.verify(&PublicKey([0x77; 32])).is_err());
    }

    #[test]
    fn test_garbage_extra_info_rejected() {
        assert!(SignedInitResponse::from_extra_info(&[0xFF, 0x01]).is_err());
    }
}
