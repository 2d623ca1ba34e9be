//! # Key Manager Policy
//!
//! The owner-authorized document describing which enclaves may run, query
//! and replicate a key manager, and how often its master secret rotates.
//!
//! ## Continuity Rule (`sanity_check_signed_policy`)
//!
//! 1. At least one signature, and every signature must verify.
//! 2. With a prior policy, the runtime ID must not change.
//! 3. With a prior policy, the serial must strictly increase.

use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use super::error::{KeyManagerError, Result};
use crate::crypto::{public_key_of, sign, verify};
use crate::registry::EnclaveIdentity;
use crate::types::{EpochTime, PublicKey, RuntimeId, Signature};

/// Signature context for key-manager policies.
pub const POLICY_SIGNATURE_CONTEXT: &[u8] = b"keyward/keymanager: policy";

/// Per-enclave permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclavePolicySgx {
    /// Enclaves of other runtimes allowed to query keys.
    pub may_query: BTreeMap<RuntimeId, Vec<EnclaveIdentity>>,
    /// Key-manager enclaves allowed to replicate the master secret.
    pub may_replicate: Vec<EnclaveIdentity>,
}

/// Key-manager policy for SGX (and insecure) deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySgx {
    pub serial: u32,
    pub id: RuntimeId,
    pub enclaves: BTreeMap<EnclaveIdentity, EnclavePolicySgx>,
    /// Minimum number of epochs between master secret rotations.
    /// Zero disables rotation.
    pub master_secret_rotation_interval: EpochTime,
    /// Number of epochs ephemeral secrets are kept by the enclaves.
    pub max_ephemeral_secret_age: EpochTime,
}

/// Public key and signature over a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBundle {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Policy plus its signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPolicySgx {
    pub policy: PolicySgx,
    pub signatures: Vec<SignatureBundle>,
}

impl SignedPolicySgx {
    /// Sign `policy` with every key in `signers`.
    pub fn sign(policy: PolicySgx, signers: &[SigningKey]) -> Result<Self> {
        let mut signatures = Vec::with_capacity(signers.len());
        for sk in signers {
            signatures.push(SignatureBundle {
                public_key: public_key_of(sk),
                signature: sign(sk, POLICY_SIGNATURE_CONTEXT, &policy)?,
            });
        }
        Ok(SignedPolicySgx { policy, signatures })
    }

    /// Verify every attached signature.
    pub fn verify_signatures(&self) -> Result<()> {
        if self.signatures.is_empty() {
            return Err(KeyManagerError::verification("policy is not signed"));
        }
        for bundle in &self.signatures {
            verify(&bundle.public_key, POLICY_SIGNATURE_CONTEXT, &self.policy, &bundle.signature)
                .map_err(|e| {
                    KeyManagerError::verification(format!(
                        "policy signature by {} invalid: {}",
                        bundle.public_key, e
                    ))
                })?;
        }
        Ok(())
    }
}

/// Validate `new` as the successor of `old`.
pub fn sanity_check_signed_policy(old: Option<&SignedPolicySgx>, new: &SignedPolicySgx) -> Result<()> {
    new.verify_signatures()?;

    if let Some(old) = old {
        if old.policy.id != new.policy.id {
            return Err(KeyManagerError::verification(format!(
                "policy runtime changed: {} -> {}",
                old.policy.id, new.policy.id
            )));
        }
        if new.policy.serial <= old.policy.serial {
            return Err(KeyManagerError::verification(format!(
                "policy serial must increase: {} -> {}",
                old.policy.serial, new.policy.serial
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signing_key_from_seed;

    fn policy(serial: u32) -> PolicySgx {
        PolicySgx {
            serial,
            id: RuntimeId([1; 32]),
            enclaves: BTreeMap::new(),
            master_secret_rotation_interval: 2,
            max_ephemeral_secret_age: 10,
        }
    }

    fn signed(serial: u32) -> SignedPolicySgx {
        SignedPolicySgx::sign(policy(serial), &[signing_key_from_seed(b"policy signer")]).expect("sign")
    }

    #[test]
    fn test_first_policy_accepted() {
        assert_eq!(sanity_check_signed_policy(None, &signed(0)), Ok(()));
    }

    #[test]
    fn test_serial_must_increase() {
        let old = signed(3);
        assert!(sanity_check_signed_policy(Some(&old), &signed(3)).is_err());
        assert!(sanity_check_signed_policy(Some(&old), &signed(2)).is_err());
        assert_eq!(sanity_check_signed_policy(Some(&old), &signed(4)), Ok(()));
    }

    #[test]
    fn test_runtime_id_must_not_change() {
        let old = signed(1);
        let mut p = policy(2);
        p.id = RuntimeId([2; 32]);
        let new = SignedPolicySgx::sign(p, &[signing_key_from_seed(b"policy signer")]).expect("sign");
        assert!(sanity_check_signed_policy(Some(&old), &new).is_err());
    }

    #[test]
    fn test_unsigned_or_tampered_rejected() {
        let unsigned = SignedPolicySgx { policy: policy(1), signatures: Vec::new() };
        assert!(sanity_check_signed_policy(None, &unsigned).is_err());

        let mut tampered = signed(1);
        tampered.policy.max_ephemeral_secret_age = 99;
        assert!(sanity_check_signed_policy(None, &tampered).is_err());
    }
}
