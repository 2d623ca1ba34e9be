//! Key-manager consensus parameters and gas costs.
//!
//! **CONSENSUS-CRITICAL**: changing the default costs changes the gas
//! charged by every replica and must be coordinated network-wide.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default gas cost of a policy update.
pub const DEFAULT_GAS_UPDATE_POLICY: u64 = 1_000;

/// Default gas cost of a master secret publication.
pub const DEFAULT_GAS_PUBLISH_MASTER_SECRET: u64 = 1_000;

/// Default gas cost of an ephemeral secret publication.
pub const DEFAULT_GAS_PUBLISH_EPHEMERAL_SECRET: u64 = 1_000;

/// Metered key-manager operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasOp {
    UpdatePolicy,
    PublishMasterSecret,
    PublishEphemeralSecret,
}

impl fmt::Display for GasOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasOp::UpdatePolicy => write!(f, "update_policy"),
            GasOp::PublishMasterSecret => write!(f, "publish_master_secret"),
            GasOp::PublishEphemeralSecret => write!(f, "publish_ephemeral_secret"),
        }
    }
}

/// Gas cost per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasCosts {
    pub update_policy: u64,
    pub publish_master_secret: u64,
    pub publish_ephemeral_secret: u64,
}

impl GasCosts {
    pub fn cost(&self, op: GasOp) -> u64 {
        match op {
            GasOp::UpdatePolicy => self.update_policy,
            GasOp::PublishMasterSecret => self.publish_master_secret,
            GasOp::PublishEphemeralSecret => self.publish_ephemeral_secret,
        }
    }
}

impl Default for GasCosts {
    fn default() -> Self {
        GasCosts {
            update_policy: DEFAULT_GAS_UPDATE_POLICY,
            publish_master_secret: DEFAULT_GAS_PUBLISH_MASTER_SECRET,
            publish_ephemeral_secret: DEFAULT_GAS_PUBLISH_EPHEMERAL_SECRET,
        }
    }
}

/// Key-manager consensus parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParameters {
    pub gas_costs: GasCosts,
}
