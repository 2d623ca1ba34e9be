//! # Published Secrets
//!
//! Master and ephemeral secrets travel through consensus encrypted to the
//! REKs of the current committee and signed with the publisher's RAK.
//!
//! ## Verification Order (Consensus-Critical)
//!
//! Master secret (`SignedEncryptedMasterSecret::verify`):
//! 1. generation == expected generation
//! 2. epoch == expected epoch
//! 3. ciphertext sanity against the committee REKs
//! 4. signature under the publisher's RAK
//!
//! Ephemeral secret (`SignedEncryptedEphemeralSecret::verify`): same, minus
//! the generation check.

use std::collections::{BTreeMap, BTreeSet};

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use super::error::{KeyManagerError, Result};
use crate::crypto::{sign, verify};
use crate::types::{EncryptionKey, EpochTime, PublicKey, RuntimeId, Signature, CHECKSUM_SIZE};

/// Signature context for master secrets.
pub const MASTER_SECRET_SIGNATURE_CONTEXT: &[u8] = b"keyward/keymanager: master secret";

/// Signature context for ephemeral secrets.
pub const EPHEMERAL_SECRET_SIGNATURE_CONTEXT: &[u8] = b"keyward/keymanager: ephemeral secret";

// ════════════════════════════════════════════════════════════════════════════════
// ENCRYPTED SECRET
// ════════════════════════════════════════════════════════════════════════════════

/// Secret encrypted to a set of REKs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// Checksum of the plaintext secret.
    pub checksum: Vec<u8>,
    /// Ephemeral public key used for encryption.
    pub pub_key: EncryptionKey,
    /// One ciphertext per recipient REK.
    pub ciphertexts: BTreeMap<EncryptionKey, Vec<u8>>,
}

impl EncryptedSecret {
    /// Check the checksum size and that the ciphertexts target exactly `reks`.
    pub fn sanity_check(&self, reks: &BTreeSet<EncryptionKey>) -> Result<()> {
        if self.checksum.len() != CHECKSUM_SIZE {
            return Err(KeyManagerError::verification(format!(
                "invalid checksum size: {}",
                self.checksum.len()
            )));
        }
        if self.ciphertexts.len() != reks.len() {
            return Err(KeyManagerError::verification(format!(
                "ciphertext count {} does not match committee size {}",
                self.ciphertexts.len(),
                reks.len()
            )));
        }
        for rek in reks {
            if !self.ciphertexts.contains_key(rek) {
                return Err(KeyManagerError::verification(format!(
                    "no ciphertext for REK {}",
                    rek
                )));
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// MASTER SECRET
// ════════════════════════════════════════════════════════════════════════════════

/// Proposal for the next master secret generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMasterSecret {
    pub id: RuntimeId,
    pub generation: u64,
    /// Epoch in which the proposal may be accepted.
    pub epoch: EpochTime,
    pub secret: EncryptedSecret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEncryptedMasterSecret {
    pub secret: EncryptedMasterSecret,
    pub signature: Signature,
}

impl SignedEncryptedMasterSecret {
    pub fn sign(secret: EncryptedMasterSecret, rak: &SigningKey) -> Result<Self> {
        let signature = sign(rak, MASTER_SECRET_SIGNATURE_CONTEXT, &secret)?;
        Ok(SignedEncryptedMasterSecret { secret, signature })
    }

    pub fn verify(
        &self,
        generation: u64,
        epoch: EpochTime,
        reks: &BTreeSet<EncryptionKey>,
        rak: &PublicKey,
    ) -> Result<()> {
        if self.secret.generation != generation {
            return Err(KeyManagerError::verification(format!(
                "master secret has invalid generation: expected {}, got {}",
                generation, self.secret.generation
            )));
        }
        if self.secret.epoch != epoch {
            return Err(KeyManagerError::verification(format!(
                "master secret has invalid epoch: expected {}, got {}",
                epoch, self.secret.epoch
            )));
        }
        self.secret.secret.sanity_check(reks)?;
        verify(rak, MASTER_SECRET_SIGNATURE_CONTEXT, &self.secret, &self.signature)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// EPHEMERAL SECRET
// ════════════════════════════════════════════════════════════════════════════════

/// Ephemeral secret for one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEphemeralSecret {
    pub id: RuntimeId,
    pub epoch: EpochTime,
    pub secret: EncryptedSecret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEncryptedEphemeralSecret {
    pub secret: EncryptedEphemeralSecret,
    pub signature: Signature,
}

impl SignedEncryptedEphemeralSecret {
    pub fn sign(secret: EncryptedEphemeralSecret, rak: &SigningKey) -> Result<Self> {
        let signature = sign(rak, EPHEMERAL_SECRET_SIGNATURE_CONTEXT, &secret)?;
        Ok(SignedEncryptedEphemeralSecret { secret, signature })
    }

    pub fn verify(&self, epoch: EpochTime, reks: &BTreeSet<EncryptionKey>, rak: &PublicKey) -> Result<()> {
        if self.secret.epoch != epoch {
            return Err(KeyManagerError::verification(format!(
                "ephemeral secret has invalid epoch: expected {}, got {}",
                epoch, self.secret.epoch
            )));
        }
        self.secret.secret.sanity_check(reks)?;
        verify(rak, EPHEMERAL_SECRET_SIGNATURE_CONTEXT, &self.secret, &self.signature)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{public_key_of, signing_key_from_seed};

    fn encrypted(reks: &[EncryptionKey]) -> EncryptedSecret {
        EncryptedSecret {
            checksum: vec![0xC0; CHECKSUM_SIZE],
            pub_key: EncryptionKey([0x01; 32]),
            ciphertexts: reks.iter().map(|k| (*k, vec![0xCC; 48])).collect(),
        }
    }

    fn reks() -> BTreeSet<EncryptionKey> {
        [EncryptionKey([0x10; 32]), EncryptionKey([0x20; 32])].into_iter().collect()
    }

    #[test]
    fn test_sanity_check_requires_exact_recipients() {
        let all: Vec<EncryptionKey> = reks().into_iter().collect();
        assert_eq!(encrypted(&all).sanity_check(&reks()), Ok(()));
        assert!(encrypted(&all[..1]).sanity_check(&reks()).is_err());

        let mut extra = all.clone();
        extra.push(EncryptionKey([0x30; 32]));
        assert!(encrypted(&extra).sanity_check(&reks()).is_err());

        let other = vec![all[0], EncryptionKey([0x30; 32])];
        assert!(encrypted(&other).sanity_check(&reks()).is_err());
    }

    #[test]
    fn test_sanity_check_rejects_bad_checksum() {
        let all: Vec<EncryptionKey> = reks().into_iter().collect();
        let mut secret = encrypted(&all);
        secret.checksum.truncate(16);
        assert!(secret.sanity_check(&reks()).is_err());
    }

    #[test]
    fn test_master_secret_verify() {
        let rak = signing_key_from_seed(b"rak");
        let all: Vec<EncryptionKey> = reks().into_iter().collect();
        let signed = SignedEncryptedMasterSecret::sign(
            EncryptedMasterSecret { id: RuntimeId([1; 32]), generation: 1, epoch: 5, secret: encrypted(&all) },
            &rak,
        )
        .expect("sign");
        let pk = public_key_of(&rak);

        assert_eq!(signed.verify(1, 5, &reks(), &pk), Ok(()));
        assert!(signed.verify(2, 5, &reks(), &pk).is_err());
        assert!(signed.verify(1, 6, &reks(), &pk).is_err());
        assert!(signed.verify(1, 5, &reks(), &PublicKey([0x42; 32])).is_err());
    }

    #[test]
    fn test_ephemeral_secret_context_differs_from_master() {
        let rak = signing_key_from_seed(b"rak");
        let all: Vec<EncryptionKey> = reks().into_iter().collect();
        let inner = EncryptedEphemeralSecret { id: RuntimeId([1; 32]), epoch: 5, secret: encrypted(&all) };
        let signed = SignedEncryptedEphemeralSecret::sign(inner.clone(), &rak).expect("sign");
        assert_eq!(signed.verify(5, &reks(), &public_key_of(&rak)), Ok(()));

        // Same payload signed under the master secret context must not verify.
        let forged = SignedEncryptedEphemeralSecret {
            secret: inner.clone(),
            signature: crate::crypto::sign(&rak, MASTER_SECRET_SIGNATURE_CONTEXT, &inner).expect("sign"),
        };
        assert!(forged.verify(5, &reks(), &public_key_of(&rak)).is_err());
    }
}
