//! # Key-Manager Status Generator
//!
//! Recomputes the status of one key-manager runtime from its prior status,
//! the pending master secret proposal and the node registry.
//!
//! ## Committee Admission
//!
//! Nodes are visited in node-ID order. A node is considered only if it is
//! unexpired and holds the key-manager role. Every one of its entries for
//! the runtime must pass, in order:
//!
//! | Step | Check | On failure |
//! |------|-------|------------|
//! | 1 | TEE class equals the runtime's | node disqualified |
//! | 2 | `verify_extra_info` | node disqualified |
//! | 3 | Policy checksum equals the status policy hash | node disqualified |
//! | 4 | `is_secure` agrees with the sticky flag | node disqualified |
//! | 5 | Checksum equals the status checksum | node disqualified |
//! | 6 | RSK agrees with the first RSK seen | node disqualified |
//! | 7 | Next checksum and next RSK match the proposal | node not credited |
//!
//! A node with at least one entry and no failure joins the committee.
//!
//! ## Rotation
//!
//! The proposal is accepted when at least
//! [`MIN_PROPOSAL_REPLICATION_PERCENT`] of the committee replicated it,
//! with `percent = replicated * 100 / committee` truncated. The committee
//! then shrinks to the replicating nodes.
//!
//! **CONSENSUS-CRITICAL**: the visiting order, the per-entry order and the
//! integer division must not change.

use std::fmt;

use tracing::error;

use keyward_common::crypto::sha3_256;
use keyward_common::keymanager::{
    InitResponse, InitState, KeyManagerError, Result, SignedEncryptedMasterSecret,
    SignedPolicySgx, Status,
};
use keyward_common::registry::{ConsensusParameters, Node, NodeRuntime, RoleMask, Runtime, TeeHardware};
use keyward_common::{EpochTime, PublicKey, CHECKSUM_SIZE};

use super::attestation::verify_extra_info;

/// Minimum share of the committee, in percent, that must replicate a
/// master secret proposal before it is accepted.
pub const MIN_PROPOSAL_REPLICATION_PERCENT: usize = 66;

// ════════════════════════════════════════════════════════════════════════════
// REJECTION REASONS
// ════════════════════════════════════════════════════════════════════════════

/// Why a node entry disqualified its node.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rejection {
    HardwareMismatch { required: TeeHardware, actual: TeeHardware },
    ExtraInfo(KeyManagerError),
    MalformedPolicyChecksum(usize),
    PolicyMismatch,
    SecurityMismatch { expected: bool, actual: bool },
    ChecksumMismatch,
    RskMismatch,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::HardwareMismatch { required, actual } => {
                write!(f, "TEE hardware mismatch (required {}, got {})", required, actual)
            }
            Rejection::ExtraInfo(e) => write!(f, "failed to validate extra info: {}", e),
            Rejection::MalformedPolicyChecksum(len) => {
                write!(f, "failed to parse policy checksum ({} bytes)", len)
            }
            Rejection::PolicyMismatch => write!(f, "policy checksum mismatch"),
            Rejection::SecurityMismatch { expected, actual } => {
                write!(f, "security status mismatch (expected {}, got {})", expected, actual)
            }
            Rejection::ChecksumMismatch => write!(f, "checksum mismatch"),
            Rejection::RskMismatch => write!(f, "runtime signing key mismatch"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PASS STATE
// ════════════════════════════════════════════════════════════════════════════

/// Values fixed for the whole pass.
struct Baseline {
    policy_hash: [u8; CHECKSUM_SIZE],
    checksum: Vec<u8>,
    next_checksum: Option<Vec<u8>>,
}

/// One node's view while its entries are checked. Starts from the status
/// and the pass-wide next RSK, and is discarded if the node fails.
struct NodeView {
    init: InitState,
    rsk: Option<PublicKey>,
    next_rsk: Option<PublicKey>,
    replicated: bool,
    entries: usize,
}

/// SHA3-256 of the bincode-encoded policy, or of the empty input.
pub fn policy_hash(policy: Option<&SignedPolicySgx>) -> Result<[u8; CHECKSUM_SIZE]> {
    match policy {
        Some(p) => {
            let raw = bincode::serialize(p)
                .map_err(|e| KeyManagerError::StateCorruption(format!("failed to encode policy: {}", e)))?;
            Ok(sha3_256(&raw))
        }
        None => Ok(sha3_256(&[])),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ════════════════════════════════════════════════════════════════════════════

/// Status generator bound to one epoch and block.
pub struct StatusGenerator<'a> {
    params: &'a ConsensusParameters,
    epoch: EpochTime,
    timestamp: u64,
    height: u64,
}

impl<'a> StatusGenerator<'a> {
    pub fn new(params: &'a ConsensusParameters, epoch: EpochTime, timestamp: u64, height: u64) -> Self {
        StatusGenerator { params, epoch, timestamp, height }
    }

    /// Compute the new status of `runtime`.
    ///
    /// `nodes` must be sorted by node ID. The only error is
    /// `StateCorruption`; per-node failures are logged and exclude the node.
    pub fn generate(
        &self,
        runtime: &Runtime,
        old: &Status,
        secret: Option<&SignedEncryptedMasterSecret>,
        nodes: &[Node],
    ) -> Result<Status> {
        let mut status = Status {
            id: runtime.id,
            is_initialized: old.is_initialized,
            is_secure: old.is_secure,
            generation: old.generation,
            rotation_epoch: old.rotation_epoch,
            checksum: old.checksum.clone(),
            policy: old.policy.clone(),
            rsk: None,
            nodes: Vec::new(),
        };

        let next_generation = status.next_generation()?;
        let baseline = Baseline {
            policy_hash: policy_hash(status.policy.as_ref())?,
            checksum: status.checksum.clone(),
            next_checksum: secret
                .filter(|s| s.secret.generation == next_generation && s.secret.epoch == self.epoch)
                .map(|s| s.secret.secret.checksum.clone()),
        };

        let mut next_rsk: Option<PublicKey> = None;
        let mut updated_nodes: Vec<PublicKey> = Vec::new();

        for node in nodes {
            if node.is_expired(self.epoch) || !node.has_roles(RoleMask::KEY_MANAGER) {
                continue;
            }

            let view = match self.evaluate_node(runtime, node, &status, &baseline, next_rsk) {
                Some(view) => view,
                None => continue,
            };
            if view.entries == 0 {
                continue;
            }
            if !view.init.is_initialized() {
                return Err(KeyManagerError::StateCorruption(format!(
                    "key manager {} admitted node {} while uninitialized",
                    runtime.id, node.id
                )));
            }

            if view.replicated {
                next_rsk = view.next_rsk;
                updated_nodes.push(node.id);
            }

            // The first admitted node fixes the sticky fields.
            status.apply_init_state(view.init);
            status.rsk = view.rsk;
            status.nodes.push(node.id);
        }

        if let Some(next_checksum) = baseline.next_checksum {
            let committee = status.nodes.len();
            if committee > 0 {
                let percent = updated_nodes.len() * 100 / committee;
                if percent >= MIN_PROPOSAL_REPLICATION_PERCENT {
                    status.generation = next_generation;
                    status.rotation_epoch = self.epoch;
                    status.checksum = next_checksum;
                    status.rsk = next_rsk;
                    status.nodes = updated_nodes;
                }
            }
        }

        Ok(status)
    }

    /// Check every entry of `node` for the runtime. `None` if the node is
    /// disqualified.
    fn evaluate_node(
        &self,
        runtime: &Runtime,
        node: &Node,
        status: &Status,
        baseline: &Baseline,
        next_rsk: Option<PublicKey>,
    ) -> Option<NodeView> {
        let mut view = NodeView {
            init: status.init_state(),
            rsk: status.rsk,
            next_rsk,
            replicated: true,
            entries: 0,
        };

        for node_rt in node.runtimes.iter().filter(|rt| rt.id == runtime.id) {
            if let Err(rejection) = self.check_entry(runtime, node, node_rt, baseline, &mut view) {
                error!(
                    runtime_id = %runtime.id,
                    node_id = %node.id,
                    version = %node_rt.version,
                    "key manager node rejected: {}",
                    rejection
                );
                return None;
            }
            view.entries += 1;
        }

        Some(view)
    }

    fn check_entry(
        &self,
        runtime: &Runtime,
        node: &Node,
        node_rt: &NodeRuntime,
        baseline: &Baseline,
        view: &mut NodeView,
    ) -> std::result::Result<(), Rejection> {
        let actual = node_rt.capabilities.hardware();
        if actual != runtime.tee_hardware {
            return Err(Rejection::HardwareMismatch { required: runtime.tee_hardware, actual });
        }

        let resp: InitResponse =
            verify_extra_info(&node.id, runtime, node_rt, self.timestamp, self.height, self.params)
                .map_err(Rejection::ExtraInfo)?;

        let node_policy_hash = match resp.policy_checksum.len() {
            0 => sha3_256(&[]),
            CHECKSUM_SIZE => {
                let mut h = [0u8; CHECKSUM_SIZE];
                h.copy_from_slice(&resp.policy_checksum);
                h
            }
            len => return Err(Rejection::MalformedPolicyChecksum(len)),
        };
        if node_policy_hash != baseline.policy_hash {
            return Err(Rejection::PolicyMismatch);
        }

        view.init
            .observe(resp.is_secure)
            .map_err(|m| Rejection::SecurityMismatch { expected: m.expected, actual: m.actual })?;

        // An empty checksum is only valid before the first master secret.
        if resp.checksum != baseline.checksum {
            return Err(Rejection::ChecksumMismatch);
        }

        if view.rsk.is_none() {
            view.rsk = resp.rsk;
        }
        // Entries without an RSK are always allowed.
        if resp.rsk.is_some() && resp.rsk != view.rsk {
            return Err(Rejection::RskMismatch);
        }

        let expected_next: &[u8] = baseline.next_checksum.as_deref().unwrap_or(&[]);
        if resp.next_checksum.as_slice() != expected_next {
            view.replicated = false;
        }
        if view.next_rsk.is_none() {
            view.next_rsk = resp.next_rsk;
        }
        if resp.next_rsk.is_some() && resp.next_rsk != view.next_rsk {
            view.replicated = false;
        }

        Ok(())
    }
}
