//! # Key-Manager Attestation
//!
//! Verification of the `SignedInitResponse` a key-manager node embeds in
//! the `extra_info` of its runtime entry.
//!
//! ## Order
//!
//! 1. Claimed TEE class and RAK (insecure placeholder without a TEE)
//! 2. Class must equal the runtime's required class
//! 3. Enclave identity and attestation freshness
//! 4. `extra_info` present and decodable
//! 5. Init response signature under the RAK

use keyward_common::keymanager::{insecure_rak, InitResponse, KeyManagerError, Result, SignedInitResponse};
use keyward_common::registry::{
    verify_node_runtime_enclave_ids, ConsensusParameters, NodeRuntime, Runtime, TeeHardware,
};
use keyward_common::PublicKey;

/// Verify and decode the init response of `node_rt`.
pub fn verify_extra_info(
    node_id: &PublicKey,
    runtime: &Runtime,
    node_rt: &NodeRuntime,
    timestamp: u64,
    height: u64,
    params: &ConsensusParameters,
) -> Result<InitResponse> {
    let (hardware, rak) = match &node_rt.capabilities.tee {
        Some(tee) if tee.hardware != TeeHardware::None => (tee.hardware, tee.rak),
        _ => (TeeHardware::None, insecure_rak()),
    };
    if hardware != runtime.tee_hardware {
        return Err(KeyManagerError::HardwareMismatch {
            required: runtime.tee_hardware,
            actual: hardware,
        });
    }

    verify_node_runtime_enclave_ids(
        node_id,
        node_rt,
        runtime,
        params.tee_features.as_ref(),
        timestamp,
        height,
    )?;

    let raw = node_rt
        .extra_info
        .as_deref()
        .ok_or_else(|| KeyManagerError::verification("missing extra info"))?;
    let untrusted = SignedInitResponse::from_extra_info(raw)?;
    untrusted.verify(&rak)?;

    Ok(untrusted.init_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_common::crypto::{public_key_of, signing_key_from_seed};
    use keyward_common::keymanager::insecure_rak_signer;
    use keyward_common::registry::{
        Capabilities, CapabilityTee, EnclaveIdentity, RuntimeKind, SgxAttestation, TeeFeatures,
        Version, VersionInfo,
    };
    use keyward_common::RuntimeId;

    const V1: Version = Version::new(1, 0, 0);

    fn enclave() -> EnclaveIdentity {
        EnclaveIdentity { mr_enclave: PublicKey([0xA1; 32]), mr_signer: PublicKey([0x55; 32]) }
    }

    fn runtime(hw: TeeHardware) -> Runtime {
        Runtime {
            id: RuntimeId([1; 32]),
            entity_id: PublicKey([2; 32]),
            kind: RuntimeKind::KeyManager,
            tee_hardware: hw,
            deployments: vec![VersionInfo { version: V1, enclaves: vec![enclave()] }],
        }
    }

    fn response() -> InitResponse {
        InitResponse { is_secure: true, checksum: vec![3; 32], ..Default::default() }
    }

    fn insecure_entry(extra_info: Option<Vec<u8>>) -> NodeRuntime {
        NodeRuntime {
            id: RuntimeId([1; 32]),
            version: V1,
            capabilities: Capabilities::default(),
            extra_info,
        }
    }

    fn sgx_params() -> ConsensusParameters {
        ConsensusParameters {
            tee_features: Some(TeeFeatures { sgx: true, max_attestation_age: 100 }),
        }
    }

    #[test]
    fn test_insecure_node_verifies_with_placeholder_rak() {
        let signed = SignedInitResponse::sign(response(), &insecure_rak_signer()).expect("sign");
        let entry = insecure_entry(Some(signed.to_extra_info().expect("encode")));
        let resp = verify_extra_info(
            &PublicKey([9; 32]),
            &runtime(TeeHardware::None),
            &entry,
            0,
            10,
            &ConsensusParameters::default(),
        )
        .expect("verify");
        assert_eq!(resp, response());
    }

    #[test]
    fn test_missing_extra_info() {
        let err = verify_extra_info(
            &PublicKey([9; 32]),
            &runtime(TeeHardware::None),
            &insecure_entry(None),
            0,
            10,
            &ConsensusParameters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KeyManagerError::VerificationFailed(_)));
    }

    #[test]
    fn test_insecure_node_for_sgx_runtime_is_mismatch() {
        let err = verify_extra_info(
            &PublicKey([9; 32]),
            &runtime(TeeHardware::IntelSgx),
            &insecure_entry(None),
            0,
            10,
            &sgx_params(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            KeyManagerError::HardwareMismatch { required: TeeHardware::IntelSgx, actual: TeeHardware::None }
        );
    }

    #[test]
    fn test_sgx_node_signed_by_own_rak() {
        let rak = signing_key_from_seed(b"sgx node rak");
        let signed = SignedInitResponse::sign(response(), &rak).expect("sign");
        let mut entry = insecure_entry(Some(signed.to_extra_info().expect("encode")));
        entry.capabilities = Capabilities {
            tee: Some(CapabilityTee {
                hardware: TeeHardware::IntelSgx,
                rak: public_key_of(&rak),
                rek: None,
                attestation: SgxAttestation { enclave: enclave(), height: 5 },
            }),
        };

        let rt = runtime(TeeHardware::IntelSgx);
        assert!(verify_extra_info(&PublicKey([9; 32]), &rt, &entry, 0, 10, &sgx_params()).is_ok());

        // Attestation older than the allowed age.
        assert!(verify_extra_info(&PublicKey([9; 32]), &rt, &entry, 0, 500, &sgx_params()).is_err());

        // Signed by someone else.
        let forged = SignedInitResponse::sign(response(), &insecure_rak_signer()).expect("sign");
        entry.extra_info = Some(forged.to_extra_info().expect("encode"));
        assert!(verify_extra_info(&PublicKey([9; 32]), &rt, &entry, 0, 10, &sgx_params()).is_err());
    }
}
