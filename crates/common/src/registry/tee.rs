//! TEE hardware classes and node TEE capabilities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EncryptionKey, PublicKey};

/// Hardware class a runtime requires or a node provides.
///
/// The set is closed. Key extraction per class lives next to the
/// key-manager records (`TeeHardware::attestation_key`,
/// `TeeHardware::encryption_key`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TeeHardware {
    /// No TEE. Key managers of this class run insecurely and use the
    /// fixed placeholder keys.
    #[default]
    None,
    /// Intel SGX.
    IntelSgx,
    /// Reserved class. Never satisfies a key-manager requirement.
    Reserved,
}

impl fmt::Display for TeeHardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeeHardware::None => write!(f, "none"),
            TeeHardware::IntelSgx => write!(f, "intel-sgx"),
            TeeHardware::Reserved => write!(f, "reserved"),
        }
    }
}

/// SGX enclave identity (measurement of code and signer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnclaveIdentity {
    pub mr_enclave: PublicKey,
    pub mr_signer: PublicKey,
}

/// Attestation a node submitted at registration time.
///
/// Quote verification happens at registration; here only the attested
/// identity and the height it was produced at are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgxAttestation {
    pub enclave: EnclaveIdentity,
    /// Block height at which the attestation was produced.
    pub height: u64,
}

/// TEE capability advertised by a node for one runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTee {
    pub hardware: TeeHardware,
    /// Runtime attestation key.
    pub rak: PublicKey,
    /// Runtime encryption key. Older nodes do not publish one.
    pub rek: Option<EncryptionKey>,
    pub attestation: SgxAttestation,
}

/// Capabilities of a node runtime entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub tee: Option<CapabilityTee>,
}

impl Capabilities {
    /// Hardware class the capability claims. No capability means
    /// [`TeeHardware::None`].
    pub fn hardware(&self) -> TeeHardware {
        self.tee.as_ref().map(|t| t.hardware).unwrap_or(TeeHardware::None)
    }
}
