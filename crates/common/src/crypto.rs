//! Crypto helpers: SHA3-256 checksums, Ed25519 signing and verification
//! with domain-separated contexts.
//! Compatible with ed25519-dalek v2 + rand_core feature enabled.
//!
//! Signed message layout:
//!   [0..n]  = signature context (domain separator)
//!   [n..]   = bincode encoding of the signed payload

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use thiserror::Error;

use crate::types::{PublicKey, Signature, CHECKSUM_SIZE};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("verification failed")]
    VerifyFailed,

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// SHA3-256 digest of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest);
    out
}

/// Deterministic signing key derived from an arbitrary seed string.
///
/// The seed is hashed, so the resulting private key is exactly as secret
/// as the seed itself.
pub fn signing_key_from_seed(seed: &[u8]) -> SigningKey {
    SigningKey::from_bytes(&sha3_256(seed))
}

/// Public half of `sk` as a [`PublicKey`].
pub fn public_key_of(sk: &SigningKey) -> PublicKey {
    PublicKey(sk.verifying_key().to_bytes())
}

/// Build the domain-separated message for `payload`.
pub fn signing_message<T: Serialize>(context: &[u8], payload: &T) -> Result<Vec<u8>, CryptoError> {
    let body = bincode::serialize(payload)?;
    let mut message = Vec::with_capacity(context.len() + body.len());
    message.extend_from_slice(context);
    message.extend_from_slice(&body);
    Ok(message)
}

/// Sign `payload` under `context`.
pub fn sign<T: Serialize>(sk: &SigningKey, context: &[u8], payload: &T) -> Result<Signature, CryptoError> {
    let message = signing_message(context, payload)?;
    Ok(Signature(sk.sign(&message).to_bytes()))
}

/// Verify a signature over `payload` under `context`.
///
/// Uses strict verification, which rejects small-order components.
pub fn verify<T: Serialize>(
    public_key: &PublicKey,
    context: &[u8],
    payload: &T,
    signature: &Signature,
) -> Result<(), CryptoError> {
    let vk = VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    let message = signing_message(context, payload)?;
    vk.verify_strict(&message, &sig).map_err(|_| CryptoError::VerifyFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    const CTX: &[u8] = b"keyward/test: v0";

    #[test]
    fn test_sign_verify_roundtrip() {
        let sk = SigningKey::generate(&mut OsRng);
        let pk = public_key_of(&sk);
        let sig = sign(&sk, CTX, &42u64).expect("sign");
        assert!(verify(&pk, CTX, &42u64, &sig).is_ok());

        // tamper payload
        assert!(matches!(verify(&pk, CTX, &43u64, &sig), Err(CryptoError::VerifyFailed)));
    }

    #[test]
    fn test_context_separates_domains() {
        let sk = signing_key_from_seed(b"ctx-test");
        let pk = public_key_of(&sk);
        let sig = sign(&sk, CTX, &"payload").expect("sign");
        assert!(verify(&pk, b"keyward/other: v0", &"payload", &sig).is_err());
    }

    #[test]
    fn test_seeded_key_is_deterministic() {
        let a = public_key_of(&signing_key_from_seed(b"seed"));
        let b = public_key_of(&signing_key_from_seed(b"seed"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_hash_is_stable() {
        assert_eq!(sha3_256(&[]), sha3_256(b""));
        assert_ne!(sha3_256(&[]), [0u8; CHECKSUM_SIZE]);
    }
}
