//! # Enclave Identity Verification
//!
//! Registry-level rule deciding whether a node runtime entry runs an
//! enclave the runtime allows, with a fresh enough attestation.
//!
//! ## Verification Logic
//!
//! 1. Non-TEE runtimes have nothing to check.
//! 2. SGX requires the network to enable SGX features.
//! 3. The runtime must deploy the version the node advertises.
//! 4. The node's attested enclave identity must be in that deployment's
//!    allowed list.
//! 5. The attestation must not be from the future and must be at most
//!    `max_attestation_age` blocks old.

use thiserror::Error;

use super::node::NodeRuntime;
use super::params::TeeFeatures;
use super::runtime::{Runtime, Version};
use super::tee::TeeHardware;
use crate::types::PublicKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnclaveError {
    #[error("TEE features not enabled")]
    TeeFeaturesDisabled,

    #[error("node {node_id} has no TEE capability")]
    MissingCapability { node_id: PublicKey },

    #[error("runtime version {version} is not deployed")]
    UnknownVersion { version: Version },

    #[error("enclave identity not allowed for version {version}")]
    EnclaveNotAllowed { version: Version },

    #[error("attestation at height {attested} is too old for height {height}")]
    StaleAttestation { attested: u64, height: u64 },

    #[error("attestation at height {attested} is from the future (height {height})")]
    FutureAttestation { attested: u64, height: u64 },

    #[error("unsupported TEE hardware {0}")]
    UnsupportedHardware(TeeHardware),
}

/// Verify the enclave identity of `node_rt` against `runtime`.
///
/// `timestamp` is carried for parity with registration-time checks; only
/// block heights bound attestation freshness here.
pub fn verify_node_runtime_enclave_ids(
    node_id: &PublicKey,
    node_rt: &NodeRuntime,
    runtime: &Runtime,
    tee_features: Option<&TeeFeatures>,
    _timestamp: u64,
    height: u64,
) -> Result<(), EnclaveError> {
    match runtime.tee_hardware {
        TeeHardware::None => Ok(()),
        TeeHardware::IntelSgx => {
            let features = match tee_features {
                Some(f) if f.sgx => f,
                _ => return Err(EnclaveError::TeeFeaturesDisabled),
            };

            let tee = node_rt
                .capabilities
                .tee
                .as_ref()
                .ok_or(EnclaveError::MissingCapability { node_id: *node_id })?;

            let deployment = runtime
                .deployment(&node_rt.version)
                .ok_or(EnclaveError::UnknownVersion { version: node_rt.version })?;

            if !deployment.enclaves.contains(&tee.attestation.enclave) {
                return Err(EnclaveError::EnclaveNotAllowed { version: node_rt.version });
            }

            let attested = tee.attestation.height;
            if attested > height {
                return Err(EnclaveError::FutureAttestation { attested, height });
            }
            if height - attested > features.max_attestation_age {
                return Err(EnclaveError::StaleAttestation { attested, height });
            }

            Ok(())
        }
        hw @ TeeHardware::Reserved => Err(EnclaveError::UnsupportedHardware(hw)),
    }
}
