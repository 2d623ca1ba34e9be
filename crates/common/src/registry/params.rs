//! Registry consensus parameters.

use serde::{Deserialize, Serialize};

/// Default maximum attestation age, in blocks.
pub const DEFAULT_MAX_ATTESTATION_AGE: u64 = 1_200;

/// TEE features enabled on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeeFeatures {
    /// SGX runtimes may register and attest.
    pub sgx: bool,
    /// Maximum age of a node attestation, in blocks.
    pub max_attestation_age: u64,
}

impl Default for TeeFeatures {
    fn default() -> Self {
        TeeFeatures {
            sgx: true,
            max_attestation_age: DEFAULT_MAX_ATTESTATION_AGE,
        }
    }
}

/// Registry consensus parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParameters {
    /// `None` means no TEE features are enabled at all.
    ///
    /// In genesis TOML an absent `[tee_features]` table disables SGX, while
    /// an empty one enables it with the default attestation age.
    pub tee_features: Option<TeeFeatures>,
}
