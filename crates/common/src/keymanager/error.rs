//! # Key Manager Error Types
//!
//! `KeyManagerError` is the error contract of every key-manager transaction
//! handler, of the status generator and of the epoch driver.
//!
//! | Category | Variants |
//! |----------|----------|
//! | Lookup | `NotFound`, `WrongKind` |
//! | Authorization | `Unauthorized`, `NotKeyManagerNode` |
//! | Hardware | `MissingTeeCapability`, `HardwareMismatch` |
//! | Recency | `StaleOrDuplicate`, `RotationNotAllowed` |
//! | Crypto / consistency | `VerificationFailed` |
//! | Metering | `BudgetExhausted` |
//! | Fatal | `StateCorruption` |
//!
//! Every variant except `StateCorruption` is local to one transaction: the
//! transaction fails and state is left untouched. `StateCorruption` means an
//! internal invariant broke and the enclosing block or epoch transition
//! must abort.

use thiserror::Error;

use crate::registry::TeeHardware;
use crate::types::{EpochTime, PublicKey, RuntimeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyManagerError {
    /// Runtime, node or status record absent.
    #[error("keymanager: {what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// Runtime exists but is not a key manager.
    #[error("keymanager: runtime is not a key manager: {0}")]
    WrongKind(RuntimeId),

    /// Signer is not the owner or not a committee member.
    #[error("keymanager: unauthorized: {0}")]
    Unauthorized(String),

    /// Signer does not advertise the key-manager runtime.
    #[error("keymanager: node {0} is not a key manager")]
    NotKeyManagerNode(PublicKey),

    /// SGX required but the node declares no TEE capability.
    #[error("keymanager: node {0} doesn't have TEE capability")]
    MissingTeeCapability(PublicKey),

    /// Hardware class unsupported or not matching the runtime.
    #[error("keymanager: TEE hardware mismatch (required {required}, got {actual})")]
    HardwareMismatch { required: TeeHardware, actual: TeeHardware },

    /// A secret was already proposed or published for the epoch.
    #[error("keymanager: {what} can be proposed once per epoch (epoch {epoch})")]
    StaleOrDuplicate { what: &'static str, epoch: EpochTime },

    /// Master secret rotation violates the policy's rotation rule.
    #[error("keymanager: master secret rotation not allowed: {0}")]
    RotationNotAllowed(String),

    /// Signature, hardware, enclave identity, checksum or policy check failed.
    #[error("keymanager: verification failed: {0}")]
    VerificationFailed(String),

    /// Gas budget exhausted.
    #[error("keymanager: out of gas (limit {limit}, used {used}, wanted {wanted})")]
    BudgetExhausted { limit: u64, used: u64, wanted: u64 },

    /// Internal invariant violated. Fatal.
    #[error("keymanager: state corruption: {0}")]
    StateCorruption(String),
}

impl KeyManagerError {
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        KeyManagerError::NotFound { what, id: id.to_string() }
    }

    pub fn verification(reason: impl ToString) -> Self {
        KeyManagerError::VerificationFailed(reason.to_string())
    }

    /// True for errors that must abort the enclosing transition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KeyManagerError::StateCorruption(_))
    }
}

impl From<crate::crypto::CryptoError> for KeyManagerError {
    fn from(e: crate::crypto::CryptoError) -> Self {
        KeyManagerError::VerificationFailed(e.to_string())
    }
}

impl From<crate::registry::EnclaveError> for KeyManagerError {
    fn from(e: crate::registry::EnclaveError) -> Self {
        KeyManagerError::VerificationFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KeyManagerError>;
